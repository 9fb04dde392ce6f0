/*!
 * Errors that can be returned by the reconciler, the catalog reads and the storage layer
 */

use std::error::Error as StdError;
use std::fmt::{Display, Formatter, Result as FmtResult};

use diesel_async::pooled_connection::deadpool::PoolError;

use crate::models::{Association, Reference};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The request body is not a JSON array of game objects
    MalformedPayload(serde_json::Error),
    MissingField { game: String, field: &'static str },
    InvalidField { game: String, field: &'static str, value: String },
    /// A scalar foreign key (difficulty level, price range) that does not resolve
    UnknownReference { game: String, reference: Reference, id: String },
    UnknownBaseGame { game: String, id: String },
    /// The base game is itself an extension, or is the game being written
    InvalidBaseGame { game: String, id: String },
    /// A non-empty association list where not a single ID resolved
    NoValidReferences { game: String, association: Association },
    MissingParameter(&'static str),
    NotFound { what: &'static str, id: String },
    Db(diesel::result::Error),
    Pool(PoolError),
    Io(std::io::Error),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::MalformedPayload(e) => write!(f, "invalid request body: {}", e),
            Self::MissingField { game, field } => write!(f, "missing {} for game {}", field, game),
            Self::InvalidField { game, field, value } => {
                write!(f, "invalid {} {:?} for game {}", field, value, game)
            }
            Self::UnknownReference { game, reference, id } => {
                write!(f, "unknown {} {:?} for game {}", reference, id, game)
            }
            Self::UnknownBaseGame { game, id } => {
                write!(f, "unknown base game {:?} for game {}", id, game)
            }
            Self::InvalidBaseGame { game, id } => {
                write!(f, "game {:?} cannot be the base game of {}", id, game)
            }
            Self::NoValidReferences { game, association } => {
                write!(f, "no valid {} found for game {}", association, game)
            }
            Self::MissingParameter(name) => write!(f, "{} is required", name),
            Self::NotFound { what, id } => write!(f, "{} {:?} not found", what, id),
            Self::Db(e) => write!(f, "{}", e),
            Self::Pool(e) => write!(f, "{}", e),
            Self::Io(e) => write!(f, "{}", e),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::MalformedPayload(e) => Some(e),
            Self::Db(e) => Some(e),
            Self::Pool(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl Error {
    /// HTTP status this error is reported with
    pub fn status(&self) -> u16 {
        match self {
            Self::MalformedPayload(_)
            | Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::UnknownReference { .. }
            | Self::UnknownBaseGame { .. }
            | Self::InvalidBaseGame { .. }
            | Self::NoValidReferences { .. }
            | Self::MissingParameter(_) => 400,
            Self::NotFound { .. } => 404,
            Self::Db(_) | Self::Pool(_) | Self::Io(_) => 500,
        }
    }

    pub fn is_internal(&self) -> bool {
        self.status() >= 500
    }

    /// Diagnostic trace: the error and every one of its sources, outermost first
    pub fn details(&self) -> Vec<String> {
        let mut chain = vec![format!("{:?}", self)];
        let mut source = self.source();
        while let Some(e) = source {
            chain.push(e.to_string());
            source = e.source();
        }
        chain
    }
}

impl From<diesel::result::Error> for Error {
    fn from(e: diesel::result::Error) -> Error {
        Error::Db(e)
    }
}

impl From<PoolError> for Error {
    fn from(e: PoolError) -> Error {
        Error::Pool(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Error {
        Error::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::MalformedPayload(e)
    }
}
