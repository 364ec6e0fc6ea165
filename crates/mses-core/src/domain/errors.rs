use std::error::Error;
use std::fmt::{Display, Formatter};

pub type MsesResult<T> = Result<T, MsesError>;
pub type DecodeResult<T> = MsesResult<T>;
pub type ComputeResult<T> = MsesResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MsesErrorCategory {
    Success,
    MalformedInput,
    ResourceExhaustion,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl MsesErrorCategory {
    pub const fn exit_placeholder(self) -> ExitPlaceholder {
        match self {
            Self::Success => ExitPlaceholder {
                exit_code: 0,
                rust_category: "Success",
                legacy_class: "SUCCESS",
            },
            Self::MalformedInput => ExitPlaceholder {
                exit_code: 2,
                rust_category: "MalformedInput",
                legacy_class: "FORMAT_FATAL",
            },
            Self::ResourceExhaustion => ExitPlaceholder {
                exit_code: 3,
                rust_category: "ResourceExhaustion",
                legacy_class: "ALLOC_FATAL",
            },
            Self::IoSystemError => ExitPlaceholder {
                exit_code: 4,
                rust_category: "IoSystemError",
                legacy_class: "IO_FATAL",
            },
            Self::ComputationError => ExitPlaceholder {
                exit_code: 5,
                rust_category: "ComputationError",
                legacy_class: "RUN_FATAL",
            },
            Self::InternalError => ExitPlaceholder {
                exit_code: 6,
                rust_category: "InternalError",
                legacy_class: "SYS_FATAL",
            },
        }
    }

    pub const fn exit_code(self) -> i32 {
        self.exit_placeholder().exit_code
    }

    pub const fn rust_category(self) -> &'static str {
        self.exit_placeholder().rust_category
    }

    pub const fn legacy_class(self) -> &'static str {
        self.exit_placeholder().legacy_class
    }

    pub const fn is_fatal(self) -> bool {
        !matches!(self, Self::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitPlaceholder {
    pub exit_code: i32,
    pub rust_category: &'static str,
    pub legacy_class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsesError {
    category: MsesErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl MsesError {
    pub fn new(
        category: MsesErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn malformed(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(MsesErrorCategory::MalformedInput, placeholder, message)
    }

    pub fn resource(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(MsesErrorCategory::ResourceExhaustion, placeholder, message)
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(MsesErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(MsesErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(MsesErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> MsesErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        let severity = if self.category.is_fatal() {
            "ERROR"
        } else {
            "INFO"
        };
        format!("{}: [{}] {}", severity, self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> Option<String> {
        self.category
            .is_fatal()
            .then(|| format!("FATAL EXIT CODE: {}", self.exit_code()))
    }
}

impl Display for MsesError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.rust_category(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for MsesError {}
