//! View models for the public and admin pages.
//!
//! Both pages keep a snapshot of the entry list and reload it in full after
//! every successful mutation and every change event. Nothing is merged
//! incrementally.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use raffle_core::{
    format_brl, full_name, total_due_cents, ChangeEvent, EntryStatus, RaffleEntry, SlotNumber,
};

use crate::client::RaffleClient;
use crate::error::PageError;
use crate::types::{AdminCredential, AdminSession};

/// Shortest PIN the admin page will send.
pub const MIN_PIN_LEN: usize = 3;

/// Display state of one slot on the public page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Free and not selected.
    Available,
    /// Free and selected locally.
    Selected,
    /// Reserved, awaiting payment.
    Reserved,
    /// Paid.
    Paid,
}

/// Public page: slot grid, selection, totals and the reservation form.
#[derive(Debug)]
pub struct PublicPage {
    client: RaffleClient,
    entries: Vec<RaffleEntry>,
    selected: BTreeSet<SlotNumber>,
    /// Buyer's first name.
    pub first_name: String,
    /// Buyer's last name.
    pub last_name: String,
    /// Buyer's phone.
    pub phone: String,
}

impl PublicPage {
    /// Create a page with an empty snapshot. Call [`reload`](Self::reload) to fill it.
    #[must_use]
    pub fn new(client: RaffleClient) -> Self {
        Self {
            client,
            entries: Vec::new(),
            selected: BTreeSet::new(),
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
        }
    }

    /// Fetch the entry list again.
    pub async fn reload(&mut self) -> Result<(), PageError> {
        let entries = self.client.list_entries().await?;
        self.apply_snapshot(entries);
        Ok(())
    }

    /// Replace the snapshot. Selected slots that are now taken are dropped.
    pub fn apply_snapshot(&mut self, entries: Vec<RaffleEntry>) {
        self.entries = entries;
        let taken: Vec<SlotNumber> = self
            .selected
            .iter()
            .copied()
            .filter(|slot| self.entry(*slot).is_some())
            .collect();
        for slot in taken {
            tracing::debug!(slot = %slot, "Selected slot was taken, deselecting");
            self.selected.remove(&slot);
        }
    }

    /// React to a change event with a full reload.
    pub async fn apply_change(&mut self, change: &ChangeEvent) -> Result<(), PageError> {
        tracing::debug!(change = %change, "Reloading public page");
        self.reload().await
    }

    /// Current snapshot, ordered by slot.
    #[must_use]
    pub fn entries(&self) -> &[RaffleEntry] {
        &self.entries
    }

    /// Display state of a slot.
    #[must_use]
    pub fn slot_state(&self, slot: SlotNumber) -> SlotState {
        match self.entry(slot).map(|e| e.status) {
            Some(EntryStatus::Paid) => SlotState::Paid,
            Some(EntryStatus::Reserved) => SlotState::Reserved,
            None if self.selected.contains(&slot) => SlotState::Selected,
            None => SlotState::Available,
        }
    }

    /// Every slot with its display state.
    pub fn slots(&self) -> impl Iterator<Item = (SlotNumber, SlotState)> + '_ {
        SlotNumber::all().map(|slot| (slot, self.slot_state(slot)))
    }

    /// Toggle selection of a free slot. Returns whether it is now selected.
    ///
    /// # Errors
    ///
    /// Returns `PageError::SlotUnavailable` for reserved or paid slots.
    pub fn toggle(&mut self, slot: SlotNumber) -> Result<bool, PageError> {
        if self.entry(slot).is_some() {
            return Err(PageError::SlotUnavailable(slot));
        }
        if self.selected.remove(&slot) {
            Ok(false)
        } else {
            self.selected.insert(slot);
            Ok(true)
        }
    }

    /// Selected slots, ascending.
    #[must_use]
    pub fn selected(&self) -> Vec<SlotNumber> {
        self.selected.iter().copied().collect()
    }

    /// Selected slots as shown on the page: `3, 7, 12`, or `-` when empty.
    #[must_use]
    pub fn selected_label(&self) -> String {
        if self.selected.is_empty() {
            return "-".to_string();
        }
        self.selected
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Total due for the selection, in cents.
    #[must_use]
    pub fn total_due_cents(&self) -> i64 {
        total_due_cents(self.selected.len())
    }

    /// Total due formatted in reais.
    #[must_use]
    pub fn total_label(&self) -> String {
        format_brl(self.total_due_cents())
    }

    /// Reserve every selected slot for the buyer in the form.
    ///
    /// On success the selection and form are cleared and the list reloaded.
    /// On failure nothing changes.
    pub async fn submit(&mut self) -> Result<Vec<SlotNumber>, PageError> {
        if self.selected.is_empty() {
            return Err(PageError::NothingSelected);
        }
        if [&self.first_name, &self.last_name, &self.phone]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(PageError::MissingFields);
        }

        let buyer_name = full_name(&self.first_name, &self.last_name);
        if self.entries.iter().any(|e| e.has_buyer_name(&buyer_name)) {
            return Err(PageError::DuplicateName(buyer_name));
        }

        let slots = self.selected();
        let reserved = self
            .client
            .reserve_batch(&slots, &buyer_name, self.phone.trim())
            .await?;
        tracing::info!(slots = ?reserved, "Reservation submitted");

        self.clear();
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Reload after reservation failed");
        }
        Ok(reserved)
    }

    /// Clear the selection and the form.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.first_name.clear();
        self.last_name.clear();
        self.phone.clear();
    }

    fn entry(&self, slot: SlotNumber) -> Option<&RaffleEntry> {
        self.entries.iter().find(|e| e.slot == slot)
    }
}

#[derive(Debug, Default)]
struct AdminState {
    pin: String,
    session: Option<AdminSession>,
    entries: Vec<RaffleEntry>,
}

/// Admin page: PIN gate, entry list and admin actions.
///
/// Methods take `&self` so the page can be shared between UI tasks; a call
/// made while another is in flight is refused with `PageError::Busy`.
#[derive(Debug)]
pub struct AdminPage {
    client: RaffleClient,
    state: Mutex<AdminState>,
    busy: AtomicBool,
}

impl AdminPage {
    /// Create a locked admin page.
    #[must_use]
    pub fn new(client: RaffleClient) -> Self {
        Self {
            client,
            state: Mutex::new(AdminState::default()),
            busy: AtomicBool::new(false),
        }
    }

    /// Set the PIN typed by the admin.
    pub fn set_pin(&self, pin: &str) {
        self.state().pin = pin.to_string();
    }

    /// Whether the page holds a live session.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.state()
            .session
            .as_ref()
            .is_some_and(AdminSession::is_active)
    }

    /// Whether an admin call is in flight.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Current snapshot, ordered by slot.
    #[must_use]
    pub fn entries(&self) -> Vec<RaffleEntry> {
        self.state().entries.clone()
    }

    /// Exchange the PIN for a session and load the entries.
    ///
    /// # Errors
    ///
    /// - `PageError::PinTooShort` before any request for short PINs.
    /// - `PageError::Api` with the server's message for a wrong PIN.
    pub async fn login(&self) -> Result<(), PageError> {
        let pin = self.state().pin.trim().to_string();
        if pin.chars().count() < MIN_PIN_LEN {
            return Err(PageError::PinTooShort { min: MIN_PIN_LEN });
        }

        let _busy = BusyGuard::acquire(&self.busy)?;
        let session = self.client.create_session(&pin).await?;
        tracing::info!(expires_at = %session.expires_at, "Admin page unlocked");
        self.state().session = Some(session);

        self.fetch_entries().await
    }

    /// Drop the session.
    pub fn logout(&self) {
        let mut state = self.state();
        state.session = None;
        state.entries.clear();
    }

    /// Fetch the entry list again.
    pub async fn reload(&self) -> Result<(), PageError> {
        self.credential()?;
        self.fetch_entries().await
    }

    /// React to a change event with a full reload. Ignored while locked.
    pub async fn apply_change(&self, change: &ChangeEvent) -> Result<(), PageError> {
        if !self.is_unlocked() {
            return Ok(());
        }
        tracing::debug!(change = %change, "Reloading admin page");
        self.fetch_entries().await
    }

    /// Mark a slot paid.
    pub async fn confirm(&self, slot: SlotNumber) -> Result<(), PageError> {
        let credential = self.credential()?;
        let _busy = BusyGuard::acquire(&self.busy)?;

        self.client.confirm_payment(slot, &credential).await?;
        self.fetch_entries().await
    }

    /// Release a slot. Returns how many entries were removed.
    pub async fn unreserve(&self, slot: SlotNumber) -> Result<u64, PageError> {
        let credential = self.credential()?;
        let _busy = BusyGuard::acquire(&self.busy)?;

        let removed = self.client.unreserve(slot, &credential).await?;
        self.fetch_entries().await?;
        Ok(removed)
    }

    /// Remove every entry. `confirmed` is the admin's answer to the prompt.
    pub async fn reset_all(&self, confirmed: bool) -> Result<u64, PageError> {
        let credential = self.credential()?;
        if !confirmed {
            return Err(PageError::ResetNotConfirmed);
        }
        let _busy = BusyGuard::acquire(&self.busy)?;

        let removed = self.client.reset(&credential).await?;
        self.fetch_entries().await?;
        Ok(removed)
    }

    async fn fetch_entries(&self) -> Result<(), PageError> {
        let entries = self.client.list_entries().await?;
        self.state().entries = entries;
        Ok(())
    }

    fn credential(&self) -> Result<AdminCredential, PageError> {
        match &self.state().session {
            Some(session) if session.is_active() => {
                Ok(AdminCredential::Session(session.token.clone()))
            }
            _ => Err(PageError::Locked),
        }
    }

    fn state(&self) -> MutexGuard<'_, AdminState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Holds the busy flag for the duration of a call.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, PageError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| PageError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use raffle_core::NewReservation;

    fn slot(n: i64) -> SlotNumber {
        SlotNumber::new(n).unwrap()
    }

    fn entry(n: i64, name: &str, paid: bool) -> RaffleEntry {
        let reservation = NewReservation::new(slot(n), name, "1199").unwrap();
        let mut entry = RaffleEntry::reserved(&reservation, Utc::now());
        if paid {
            entry.mark_paid(Utc::now());
        }
        entry
    }

    fn page() -> PublicPage {
        PublicPage::new(RaffleClient::new("http://127.0.0.1:9").unwrap())
    }

    #[test]
    fn slot_states_follow_snapshot_and_selection() {
        let mut page = page();
        page.apply_snapshot(vec![entry(3, "Ana Silva", false), entry(4, "Bruno Lima", true)]);
        page.toggle(slot(5)).unwrap();

        assert_eq!(page.slot_state(slot(3)), SlotState::Reserved);
        assert_eq!(page.slot_state(slot(4)), SlotState::Paid);
        assert_eq!(page.slot_state(slot(5)), SlotState::Selected);
        assert_eq!(page.slot_state(slot(6)), SlotState::Available);
        assert_eq!(page.slots().count(), 100);
    }

    #[test]
    fn toggle_refuses_taken_slots() {
        let mut page = page();
        page.apply_snapshot(vec![entry(3, "Ana Silva", false)]);

        assert!(matches!(
            page.toggle(slot(3)),
            Err(PageError::SlotUnavailable(s)) if s == slot(3)
        ));
        assert!(page.selected().is_empty());
    }

    #[test]
    fn toggle_twice_deselects() {
        let mut page = page();
        assert!(page.toggle(slot(9)).unwrap());
        assert!(!page.toggle(slot(9)).unwrap());
        assert_eq!(page.selected_label(), "-");
    }

    #[test]
    fn selection_is_sorted_and_priced() {
        let mut page = page();
        for n in [12, 3, 7] {
            page.toggle(slot(n)).unwrap();
        }

        assert_eq!(page.selected_label(), "3, 7, 12");
        assert_eq!(page.total_due_cents(), 3000);
        assert_eq!(page.total_label(), "R$ 30,00");
    }

    #[test]
    fn empty_selection_costs_nothing() {
        let page = page();
        assert_eq!(page.selected_label(), "-");
        assert_eq!(page.total_label(), "R$ 0,00");
    }

    #[test]
    fn snapshot_drops_taken_selections() {
        let mut page = page();
        page.toggle(slot(5)).unwrap();
        page.toggle(slot(6)).unwrap();

        page.apply_snapshot(vec![entry(5, "Ana Silva", false)]);

        assert_eq!(page.selected(), vec![slot(6)]);
    }

    #[tokio::test]
    async fn submit_checks_run_before_any_request() {
        let mut page = page();
        assert!(matches!(page.submit().await, Err(PageError::NothingSelected)));

        page.toggle(slot(1)).unwrap();
        page.first_name = "Ana".into();
        page.last_name = "  ".into();
        page.phone = "1199".into();
        assert!(matches!(page.submit().await, Err(PageError::MissingFields)));

        page.apply_snapshot(vec![entry(2, "ana silva", false)]);
        page.last_name = "Silva".into();
        assert!(matches!(
            page.submit().await,
            Err(PageError::DuplicateName(name)) if name == "Ana Silva"
        ));
        assert_eq!(page.selected(), vec![slot(1)]);
    }

    #[tokio::test]
    async fn admin_actions_require_session() {
        let admin = AdminPage::new(RaffleClient::new("http://127.0.0.1:9").unwrap());

        assert!(!admin.is_unlocked());
        assert!(matches!(admin.confirm(slot(1)).await, Err(PageError::Locked)));
        assert!(matches!(admin.unreserve(slot(1)).await, Err(PageError::Locked)));
        assert!(matches!(admin.reset_all(true).await, Err(PageError::Locked)));
        assert!(matches!(admin.reload().await, Err(PageError::Locked)));
    }

    #[tokio::test]
    async fn short_pin_is_rejected_locally() {
        let admin = AdminPage::new(RaffleClient::new("http://127.0.0.1:9").unwrap());
        admin.set_pin(" 12 ");

        assert!(matches!(
            admin.login().await,
            Err(PageError::PinTooShort { min: 3 })
        ));
        assert!(!admin.is_busy());
    }

    #[test]
    fn busy_guard_refuses_second_holder() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(PageError::Busy)));
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }
}
