//! Error taxonomy for packed-netlist ingestion.
//!
//! All ingest errors are fatal: they propagate to the top of the pipeline
//! with no local recovery. Each variant carries the netlist file name, the
//! 1-based source line where the problem was detected (0 when it surfaced
//! after parsing), and a one-line explanation.

/// Errors raised while reading and cross-checking a packed netlist.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The document violates the packed-netlist schema: bad markup, a
    /// missing required attribute or element, or a wrong literal.
    #[error("{file}:{line}: {message}")]
    Schema {
        /// Netlist file name.
        file: String,
        /// 1-based source line.
        line: u32,
        /// One-line explanation.
        message: String,
    },

    /// The document names an entity the architecture or the atom netlist
    /// does not know: a block, net, port, pin, interconnect, mode, or
    /// pb type.
    #[error("{file}:{line}: {message}")]
    UnknownEntity {
        /// Netlist file name.
        file: String,
        /// 1-based source line.
        line: u32,
        /// One-line explanation.
        message: String,
    },

    /// A structural count disagrees with the architecture: wrong number of
    /// pins for a port, an instance slot out of range, or a slot occupied
    /// twice.
    #[error("{file}:{line}: {message}")]
    ShapeMismatch {
        /// Netlist file name.
        file: String,
        /// 1-based source line.
        line: u32,
        /// One-line explanation.
        message: String,
    },

    /// The ingested data is internally inconsistent: global and non-global
    /// pins mixed on one net, a constant-generator output whose driver is
    /// not marked constant, or an atom left unbound after ingest.
    #[error("{file}: {message}")]
    Consistency {
        /// Netlist file name.
        file: String,
        /// One-line explanation.
        message: String,
    },
}

impl PackError {
    /// Creates a [`PackError::Schema`].
    pub fn schema(file: &str, line: u32, message: impl Into<String>) -> Self {
        Self::Schema {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Creates a [`PackError::UnknownEntity`].
    pub fn unknown(file: &str, line: u32, message: impl Into<String>) -> Self {
        Self::UnknownEntity {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Creates a [`PackError::ShapeMismatch`].
    pub fn shape(file: &str, line: u32, message: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            file: file.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Creates a [`PackError::Consistency`].
    pub fn consistency(file: &str, message: impl Into<String>) -> Self {
        Self::Consistency {
            file: file.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_display() {
        let e = PackError::schema("top.net", 3, "Root element must be 'block'");
        assert_eq!(e.to_string(), "top.net:3: Root element must be 'block'");
    }

    #[test]
    fn unknown_display() {
        let e = PackError::unknown("top.net", 12, "Unknown pb type lut5");
        assert_eq!(e.to_string(), "top.net:12: Unknown pb type lut5");
    }

    #[test]
    fn consistency_display() {
        let e = PackError::consistency("top.net", "unbound atom 'f'");
        assert_eq!(e.to_string(), "top.net: unbound atom 'f'");
    }
}
