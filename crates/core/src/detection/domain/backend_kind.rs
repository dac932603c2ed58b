use std::fmt;
use std::str::FromStr;

use super::detection_backend::BackendError;

/// The two detector families a job can be run with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// ResNet-10 SSD loaded from a Caffe topology + weights pair.
    Caffe,
    /// Viola-Jones Haar cascade.
    Haar,
}

impl BackendKind {
    pub const ALL: &'static [BackendKind] = &[BackendKind::Caffe, BackendKind::Haar];

    /// Identifier used on the command line and as the output file prefix.
    pub fn id(self) -> &'static str {
        match self {
            BackendKind::Caffe => "caffe",
            BackendKind::Haar => "haar",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BackendKind {
    type Err = BackendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| BackendError::InvalidBackend(s.to_string()))
    }
}
