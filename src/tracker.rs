//! The attendance register as the front ends see it.
//!
//! `Tracker` owns the current [`AppState`], the scan debouncer and the status
//! banner, and writes the state back to storage after every change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Duration;
use log::{debug, info};

use crate::auth::CredentialVerifier;
use crate::clock::{format_check_in, Clock};
use crate::config::Settings;
use crate::error::{AttendError, Result};
use crate::report::AttendanceReport;
use crate::roster::{MarkOutcome, Roster, SeedStudent};
use crate::scan::{Banner, ScanDebouncer};
use crate::session::{AppState, CourseInfo, Gate, SetupForm};
use crate::storage::{self, Storage};

pub struct Tracker {
    state: AppState,
    seed: Vec<SeedStudent>,
    institution: String,
    default_course_title: String,
    banner_lifetime: Duration,
    debouncer: ScanDebouncer,
    banner: Option<Banner>,
    storage: Box<dyn Storage>,
    verifier: Box<dyn CredentialVerifier>,
    clock: Arc<dyn Clock>,
}

impl Tracker {
    /// Restore the register from `storage`, seeding anything not stored yet
    pub fn open(
        settings: &Settings,
        seed: Vec<SeedStudent>,
        storage: Box<dyn Storage>,
        verifier: Box<dyn CredentialVerifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let defaults = AppState::fresh(&seed, &settings.default_course_title, clock.today())?;
        let state = storage::load_state(storage.as_ref(), defaults);
        debug!("Restored state at gate {:?}", state.gate());

        Ok(Self {
            state,
            seed,
            institution: settings.institution.clone(),
            default_course_title: settings.default_course_title.clone(),
            banner_lifetime: settings.banner_lifetime(),
            debouncer: ScanDebouncer::new(settings.debounce_window()),
            banner: None,
            storage,
            verifier,
            clock,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn gate(&self) -> Gate {
        self.state.gate()
    }

    pub fn course(&self) -> &CourseInfo {
        &self.state.course
    }

    pub fn roster(&self) -> &Roster {
        &self.state.roster
    }

    /// Apply a state transition and persist the result
    fn commit(&mut self, next: AppState) -> Result<()> {
        storage::save_state(self.storage.as_mut(), &next)?;
        self.state = next;
        Ok(())
    }

    pub fn login(&mut self, secret: &str) -> Result<()> {
        let next = self.state.clone().login(self.verifier.as_ref(), secret)?;
        self.commit(next)
    }

    pub fn complete_setup(&mut self, form: SetupForm) -> Result<()> {
        let next = self.state.clone().start_session(form, self.clock.today())?;
        self.commit(next)
    }

    pub fn edit_setup(&mut self) -> Result<()> {
        let next = self.state.clone().edit_setup()?;
        self.commit(next)
    }

    /// Wipe stored state and go back to the seeded, logged-out register
    pub fn logout(&mut self) -> Result<()> {
        self.storage.clear()?;
        self.state = AppState::reset(&self.seed, &self.default_course_title, self.clock.today())?;
        self.debouncer.clear();
        self.banner = None;
        info!("Logged out");
        Ok(())
    }

    /// Mark a matric number present without debouncing, e.g. typed by hand
    pub fn mark(&mut self, matric: &str) -> Result<MarkOutcome> {
        if self.gate() != Gate::Active {
            return Err(AttendError::SessionInactive);
        }

        let now = self.clock.now();
        let (next, outcome) = self.state.clone().mark_present(matric, &format_check_in(now));
        if outcome.is_success() {
            self.commit(next)?;
        }
        self.banner = Some(Banner::for_outcome(&outcome, now, self.banner_lifetime));
        Ok(outcome)
    }

    /// Handle one decoded scan. Returns `Ok(None)` when the scan repeats the
    /// previous one inside the debounce window.
    pub fn submit_scan(&mut self, decoded: &str) -> Result<Option<MarkOutcome>> {
        if self.gate() != Gate::Active {
            return Err(AttendError::SessionInactive);
        }

        let matric = decoded.trim();
        if !self.debouncer.admit(matric, self.clock.now()) {
            return Ok(None);
        }
        self.mark(matric).map(Some)
    }

    /// The status banner, if it has not expired yet
    pub fn banner(&self) -> Option<&Banner> {
        let now = self.clock.now();
        self.banner.as_ref().filter(|b| b.is_visible(now))
    }

    pub fn report(&self) -> AttendanceReport {
        AttendanceReport::new(&self.institution, &self.state.course, &self.state.roster)
    }

    pub fn export_to(&self, path: &Path) -> Result<()> {
        self.report().save(path)
    }

    pub fn export_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        self.report().save_to_dir(dir)
    }
}
