//! Session descriptor, gate states and the application state they live in.
//!
//! `AppState` is a plain value. Every operation consumes it and hands back
//! the next state, so the whole lifecycle can be exercised without a UI.

use chrono::NaiveDate;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::auth::CredentialVerifier;
use crate::clock::format_date;
use crate::error::{AttendError, Result};
use crate::roster::{MarkOutcome, Roster, SeedStudent};

/// Descriptor of the class being registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseInfo {
    pub department: String,
    pub course_code: String,
    pub course_title: String,
    pub level: String,
    pub date: String,
}

impl CourseInfo {
    /// Empty descriptor carrying only the default title and today's date
    pub fn blank(course_title: &str, today: NaiveDate) -> Self {
        Self {
            department: String::new(),
            course_code: String::new(),
            course_title: course_title.to_string(),
            level: String::new(),
            date: format_date(today),
        }
    }
}

/// Fields collected by the setup form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupForm {
    pub department: String,
    pub course_code: String,
    pub level: String,
    pub course_title: Option<String>,
}

impl SetupForm {
    /// Pre-fill from an existing descriptor, used when re-entering setup
    pub fn from_course(course: &CourseInfo) -> Self {
        Self {
            department: course.department.clone(),
            course_code: course.course_code.clone(),
            level: course.level.clone(),
            course_title: Some(course.course_title.clone()),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.course_code.trim().is_empty() && !self.level.trim().is_empty()
    }
}

/// Where the user is in the login → setup → register flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Unauthenticated,
    SetupIncomplete,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub authenticated: bool,
    pub setup_complete: bool,
    pub course: CourseInfo,
    pub roster: Roster,
}

impl AppState {
    /// Logged-out state with an all-absent roster
    pub fn fresh(seed: &[SeedStudent], course_title: &str, today: NaiveDate) -> Result<Self> {
        Ok(Self {
            authenticated: false,
            setup_complete: false,
            course: CourseInfo::blank(course_title, today),
            roster: Roster::from_seed(seed)?,
        })
    }

    pub fn gate(&self) -> Gate {
        if !self.authenticated {
            Gate::Unauthenticated
        } else if !self.setup_complete {
            Gate::SetupIncomplete
        } else {
            Gate::Active
        }
    }

    pub fn login(self, verifier: &dyn CredentialVerifier, secret: &str) -> Result<Self> {
        if !verifier.verify(secret) {
            warn!("Rejected login attempt");
            return Err(AttendError::IncorrectPin);
        }

        info!("Course representative logged in");
        Ok(Self {
            authenticated: true,
            ..self
        })
    }

    /// Validate the setup form and open the register. The session date is
    /// stamped here.
    pub fn start_session(self, form: SetupForm, today: NaiveDate) -> Result<Self> {
        if !self.authenticated {
            return Err(AttendError::NotAuthenticated);
        }
        if !form.is_complete() {
            return Err(AttendError::IncompleteSetup);
        }

        let course = CourseInfo {
            department: form.department.trim().to_string(),
            course_code: form.course_code.trim().to_string(),
            course_title: form
                .course_title
                .unwrap_or_else(|| self.course.course_title.clone()),
            level: form.level.trim().to_string(),
            date: format_date(today),
        };
        info!("Session started for {} ({})", course.course_code, course.level);

        Ok(Self {
            setup_complete: true,
            course,
            ..self
        })
    }

    /// Back to the setup form. Attendance taken so far is kept. Only an
    /// active session can be edited.
    pub fn edit_setup(self) -> Result<Self> {
        if self.gate() != Gate::Active {
            return Err(AttendError::SessionInactive);
        }
        Ok(Self {
            setup_complete: false,
            ..self
        })
    }

    pub fn mark_present(mut self, matric: &str, check_in_time: &str) -> (Self, MarkOutcome) {
        let outcome = self.roster.mark_present(matric, check_in_time);
        (self, outcome)
    }

    /// Logout: everything back to the seed
    pub fn reset(seed: &[SeedStudent], course_title: &str, today: NaiveDate) -> Result<Self> {
        info!("Attendance state reset");
        Self::fresh(seed, course_title, today)
    }
}
