//! Session state machine
//!
//! A session is one run of a diagnostic tool. It moves
//! `Initial -> Started -> {Stopped, Error}` through [`Session::reduce`];
//! the terminal states freeze the recorded samples.

use thiserror::Error;

/// Target, location and samples of a run that has been started
#[derive(Debug, Clone, PartialEq)]
pub struct Run<S> {
    pub target: String,
    pub location: String,
    pub samples: Vec<S>,
}

impl<S> Run<S> {
    fn new(target: String, location: String) -> Self {
        Self {
            target,
            location,
            samples: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Session<S> {
    Initial,
    Started(Run<S>),
    Stopped(Run<S>),
    /// `run` is None when the session failed before it was started
    Error { run: Option<Run<S>>, error: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Initial,
    Started,
    Stopped,
    Error,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Initial => "initial",
            Status::Started => "started",
            Status::Stopped => "stopped",
            Status::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Transition<S> {
    Start { target: String, location: String },
    Record(S),
    Stop,
    Fail(String),
}

impl<S> Transition<S> {
    fn name(&self) -> &'static str {
        match self {
            Transition::Start { .. } => "start",
            Transition::Record(_) => "record",
            Transition::Stop => "stop",
            Transition::Fail(_) => "fail",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot {transition} a session in state {status}")]
pub struct TransitionError {
    pub transition: &'static str,
    pub status: Status,
}

impl<S> Default for Session<S> {
    fn default() -> Self {
        Session::Initial
    }
}

impl<S> Session<S> {
    pub fn status(&self) -> Status {
        match self {
            Session::Initial => Status::Initial,
            Session::Started(_) => Status::Started,
            Session::Stopped(_) => Status::Stopped,
            Session::Error { .. } => Status::Error,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Session::Started(_))
    }

    pub fn run(&self) -> Option<&Run<S>> {
        match self {
            Session::Initial => None,
            Session::Started(run) | Session::Stopped(run) => Some(run),
            Session::Error { run, .. } => run.as_ref(),
        }
    }

    pub fn target(&self) -> Option<&str> {
        self.run().map(|r| r.target.as_str())
    }

    #[allow(dead_code)]
    pub fn location(&self) -> Option<&str> {
        self.run().map(|r| r.location.as_str())
    }

    pub fn samples(&self) -> &[S] {
        self.run().map(|r| r.samples.as_slice()).unwrap_or(&[])
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            Session::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Apply a transition, returning the next state. Invalid transitions
    /// leave the state unchanged.
    #[allow(dead_code)]
    pub fn reduce(self, transition: Transition<S>) -> Self {
        match self.try_reduce(transition) {
            Ok(next) | Err((next, _)) => next,
        }
    }

    fn try_reduce(self, transition: Transition<S>) -> Result<Self, (Self, TransitionError)> {
        let name = transition.name();
        match (self, transition) {
            (state, Transition::Start { target, location }) if !state.is_started() => {
                Ok(Session::Started(Run::new(target, location)))
            }
            (Session::Started(mut run), Transition::Record(sample)) => {
                run.samples.push(sample);
                Ok(Session::Started(run))
            }
            (Session::Started(run), Transition::Stop) => Ok(Session::Stopped(run)),
            (Session::Started(run), Transition::Fail(error)) => Ok(Session::Error {
                run: Some(run),
                error,
            }),
            (Session::Initial, Transition::Fail(error)) => Ok(Session::Error { run: None, error }),
            (state, _) => {
                let status = state.status();
                Err((state, TransitionError { transition: name, status }))
            }
        }
    }

    fn apply(&mut self, transition: Transition<S>) -> Result<(), TransitionError> {
        let state = std::mem::take(self);
        match state.try_reduce(transition) {
            Ok(next) => {
                *self = next;
                Ok(())
            }
            Err((prev, err)) => {
                *self = prev;
                Err(err)
            }
        }
    }

    /// Begin a fresh run. Valid from `Initial` or a terminal state.
    pub fn start(
        &mut self,
        target: impl Into<String>,
        location: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.apply(Transition::Start {
            target: target.into(),
            location: location.into(),
        })
    }

    pub fn record_sample(&mut self, sample: S) -> Result<(), TransitionError> {
        self.apply(Transition::Record(sample))
    }

    pub fn stop(&mut self) -> Result<(), TransitionError> {
        self.apply(Transition::Stop)
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), TransitionError> {
        self.apply(Transition::Fail(error.into()))
    }
}
