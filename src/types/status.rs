use serde::{Deserialize, Serialize};

/// Lifecycle of an application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
  Applied,
  Interview,
  Selected,
  Rejected,
}

impl ApplicationStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      ApplicationStatus::Applied => "Applied",
      ApplicationStatus::Interview => "Interview",
      ApplicationStatus::Selected => "Selected",
      ApplicationStatus::Rejected => "Rejected",
    }
  }
}

impl std::str::FromStr for ApplicationStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "Applied" => Ok(ApplicationStatus::Applied),
      "Interview" => Ok(ApplicationStatus::Interview),
      "Selected" => Ok(ApplicationStatus::Selected),
      "Rejected" => Ok(ApplicationStatus::Rejected),
      _ => Err(format!("unknown application status: {}", s)),
    }
  }
}

impl std::fmt::Display for ApplicationStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
