use std::fmt::Display;

use super::BlockNumber;

/// Identifies one block inside one named file of the data directory.
///
/// Plain value: cheap to hash and compare, safe as a map key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId {
    file_name: String,
    number: BlockNumber,
}

impl BlockId {
    pub fn new(file_name: impl Into<String>, number: BlockNumber) -> Self {
        Self {
            file_name: file_name.into(),
            number,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn number(&self) -> BlockNumber {
        self.number
    }
}

impl Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[file='{}', no='{}']", self.file_name, self.number)
    }
}
