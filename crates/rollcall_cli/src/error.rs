use rollcall_core::{
    ActivityServiceError, AttendanceServiceError, ConfigError, DbError, LoggingError,
    StudentServiceError,
};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum CliError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
    Students(StudentServiceError),
    Attendance(AttendanceServiceError),
    Activities(ActivityServiceError),
    /// The operator declined a destructive action.
    Aborted,
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "configuration error: {err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Students(err) => write!(f, "{err}"),
            Self::Attendance(err) => write!(f, "{err}"),
            Self::Activities(err) => write!(f, "{err}"),
            Self::Aborted => write!(f, "aborted; nothing was deleted"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "failed to encode output: {err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Students(err) => Some(err),
            Self::Attendance(err) => Some(err),
            Self::Activities(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Aborted => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for CliError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<StudentServiceError> for CliError {
    fn from(value: StudentServiceError) -> Self {
        Self::Students(value)
    }
}

impl From<AttendanceServiceError> for CliError {
    fn from(value: AttendanceServiceError) -> Self {
        Self::Attendance(value)
    }
}

impl From<ActivityServiceError> for CliError {
    fn from(value: ActivityServiceError) -> Self {
        Self::Activities(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}
