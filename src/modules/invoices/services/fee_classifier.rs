use serde::{Deserialize, Serialize};

/// How a fee head's name affects invoice generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeKind {
    /// Charged only to students living in the hostel
    Hostel,
    /// Charged only to transport users, priced by their bus stop when it has a fee
    Transport,
    /// Charged to every student of the course
    Generic,
}

impl FeeKind {
    /// Classify a fee head by case-insensitive substring match on its name.
    /// "hostel" wins over "transport"/"bus" when a name contains both.
    pub fn classify(fee_head_name: &str) -> Self {
        let name = fee_head_name.to_lowercase();

        if name.contains("hostel") {
            FeeKind::Hostel
        } else if name.contains("transport") || name.contains("bus") {
            FeeKind::Transport
        } else {
            FeeKind::Generic
        }
    }
}
