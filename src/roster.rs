use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{AttendError, Result};

/// Built-in class list used when no roster file is configured
const DEFAULT_SEED: &str = include_str!("../assets/students.json");

/// Attendance status of a roster entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Absent,
    Present,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Absent => write!(f, "Absent"),
            Status::Present => write!(f, "Present"),
        }
    }
}

/// A student as listed in the seed, before any attendance is taken
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStudent {
    pub id: u32,
    pub name: String,
    pub matric: String,
}

/// A roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: u32,
    pub name: String,
    pub matric: String,
    pub status: Status,
    pub check_in_time: Option<String>,
}

impl Student {
    pub fn is_present(&self) -> bool {
        self.status == Status::Present
    }
}

impl From<&SeedStudent> for Student {
    fn from(seed: &SeedStudent) -> Self {
        Self {
            id: seed.id,
            name: seed.name.clone(),
            matric: seed.matric.clone(),
            status: Status::Absent,
            check_in_time: None,
        }
    }
}

/// Result of trying to mark a matric number present
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkOutcome {
    CheckedIn { name: String },
    AlreadyCheckedIn { name: String },
    NotFound { matric: String },
}

impl MarkOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, MarkOutcome::CheckedIn { .. })
    }

    /// Text shown in the transient status banner
    pub fn message(&self) -> String {
        match self {
            MarkOutcome::CheckedIn { name } => format!("✅ {} Checked In!", name),
            MarkOutcome::AlreadyCheckedIn { name } => format!("⚠️ {} is already checked in!", name),
            MarkOutcome::NotFound { matric } => format!("❌ ID: {} not found.", matric),
        }
    }
}

/// Ordered class list. Order is seed order and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    students: Vec<Student>,
}

impl Roster {
    /// Build an all-absent roster from a seed, rejecting duplicate matric numbers
    pub fn from_seed(seed: &[SeedStudent]) -> Result<Self> {
        if let Some(matric) = first_duplicate(seed.iter().map(|s| s.matric.as_str())) {
            return Err(AttendError::DuplicateMatric(matric.to_string()));
        }

        Ok(Self {
            students: seed.iter().map(Student::from).collect(),
        })
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn find(&self, matric: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.matric == matric)
    }

    /// First matric number held by more than one student, if any
    pub fn duplicate_matric(&self) -> Option<&str> {
        first_duplicate(self.students.iter().map(|s| s.matric.as_str()))
    }

    pub fn present_count(&self) -> usize {
        self.students.iter().filter(|s| s.is_present()).count()
    }

    pub fn absent_count(&self) -> usize {
        self.len() - self.present_count()
    }

    /// Mark the student with this exact matric number present, stamping
    /// `check_in_time`. A student already present is left untouched.
    pub fn mark_present(&mut self, matric: &str, check_in_time: &str) -> MarkOutcome {
        let Some(student) = self.students.iter_mut().find(|s| s.matric == matric) else {
            debug!("No roster entry for {}", matric);
            return MarkOutcome::NotFound {
                matric: matric.to_string(),
            };
        };

        if student.is_present() {
            debug!("{} ({}) already checked in", student.name, matric);
            return MarkOutcome::AlreadyCheckedIn {
                name: student.name.clone(),
            };
        }

        student.status = Status::Present;
        student.check_in_time = Some(check_in_time.to_string());
        info!("Checked in {} ({}) at {}", student.name, matric, check_in_time);

        MarkOutcome::CheckedIn {
            name: student.name.clone(),
        }
    }
}

fn first_duplicate<'a>(mut matrics: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let mut seen = HashSet::new();
    matrics.find(|m| !seen.insert(*m))
}

/// The built-in class list
pub fn default_seed() -> Result<Vec<SeedStudent>> {
    Ok(serde_json::from_str(DEFAULT_SEED)?)
}

/// Read a class list from a JSON array of `{"id", "name", "matric"}` objects
pub fn load_seed(path: &Path) -> Result<Vec<SeedStudent>> {
    let content = fs::read_to_string(path)?;
    let seed: Vec<SeedStudent> = serde_json::from_str(&content)?;
    info!("Loaded {} students from {}", seed.len(), path.display());
    Ok(seed)
}
