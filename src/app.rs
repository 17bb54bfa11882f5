use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::layout::Rect;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::announce::Announcer;
use crate::components::help::HelpOverlay;
use crate::config::AppConfig;
use crate::event::Event;
use crate::navigation::{Direction, NavOutcome, NavigationController};
use crate::preview::blob::BlobRegistry;
use crate::preview::cache::PreviewUrlCache;
use crate::preview::preload::{DecodeSource, DecodedImage, Preloader};
use crate::reorder::{Move, ReorderController, ReorderTarget};
use crate::staging::export;
use crate::staging::item::{Attachment, ItemId, ItemKind};
use crate::staging::loader::{self, PendingFile};
use crate::staging::store::StagingStore;
use crate::staging::validate::{Candidate, ValidationRules};
use crate::submit::{self, Manifest, ManifestSubmitter, SubmitOutcome, Submitter};
use crate::theme::{self, ThemeColors};

/// How long an informational status message stays up.
const STATUS_TTL: Duration = Duration::from_secs(3);
/// Validation errors stay up longer.
const ERROR_TTL: Duration = Duration::from_secs(5);

/// Overlays drawn on top of the list or preview.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    ConfirmDelete {
        id: ItemId,
        name: String,
    },
    Help,
}

/// Which part of the preview modal receives arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewFocus {
    Image,
    Thumbnails { focused: usize },
}

/// State that exists only while the preview modal is mounted.
#[derive(Debug)]
pub struct PreviewState {
    pub nav: NavigationController,
    pub focus: PreviewFocus,
    pub thumb_scroll: usize,
}

/// Screen regions from the last render, used for mouse hit testing.
#[derive(Debug, Default, Clone)]
pub struct LayoutRegions {
    pub list: Rect,
    pub image: Rect,
    pub thumbnails: Vec<(usize, Rect)>,
}

impl LayoutRegions {
    pub fn thumbnail_at(&self, column: u16, row: u16) -> Option<usize> {
        self.thumbnails
            .iter()
            .find(|(_, rect)| contains(*rect, column, row))
            .map(|(index, _)| *index)
    }
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub created: Instant,
    pub is_error: bool,
}

/// Main application state.
pub struct App {
    pub config: AppConfig,
    pub theme: ThemeColors,
    pub rules: ValidationRules,
    pub store: StagingStore,
    pub registry: BlobRegistry,
    pub cache: PreviewUrlCache,
    pub preloader: Preloader,
    pub reorder: ReorderController,
    pub announcer: Announcer,
    pub preview: Option<PreviewState>,
    /// Cursor in the attachment list.
    pub selected: usize,
    pub mode: AppMode,
    pub help_scroll: usize,
    pub status_message: Option<StatusMessage>,
    pub submitting: bool,
    /// Ids in the manifest of the submission in flight.
    submitted: Vec<ItemId>,
    pub should_quit: bool,
    pub layout: LayoutRegions,
    /// Thumbnail under the last left-button press, for drag detection.
    pub pointer_press: Option<usize>,
    submitter: Arc<dyn Submitter>,
    event_tx: Option<mpsc::UnboundedSender<Event>>,
}

/// Reorder adapter over the store, the open preview and the announcer.
struct SessionTarget<'a> {
    store: &'a mut StagingStore,
    nav: Option<&'a mut NavigationController>,
    announcer: &'a mut Announcer,
    selected: &'a mut usize,
    now: Instant,
}

impl ReorderTarget for SessionTarget<'_> {
    fn len(&self) -> usize {
        self.store.len()
    }

    fn reorder(&mut self, from: usize, to: usize) -> bool {
        self.store.reorder(from, to)
    }

    fn follow(&mut self, index: usize) {
        *self.selected = index;
        if let Some(nav) = self.nav.as_deref_mut() {
            nav.follow(index);
            if let Some(id) = self.store.get(index).map(|item| item.id.clone()) {
                self.store.set_active(Some(&id));
            }
        }
    }

    fn announce(&mut self, message: String) {
        self.announcer.announce(message, self.now);
    }
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let theme = theme::resolve_theme(&config.theme);
        let rules = config.validation_rules();
        let announcer = Announcer::new(config.announcement_ttl());
        let submitter: Arc<dyn Submitter> = Arc::new(ManifestSubmitter::new(config.manifest_path()));
        Self {
            config,
            theme,
            rules,
            store: StagingStore::new(),
            registry: BlobRegistry::new(),
            cache: PreviewUrlCache::new(),
            preloader: Preloader::new(),
            reorder: ReorderController::new(),
            announcer,
            preview: None,
            selected: 0,
            mode: AppMode::Normal,
            help_scroll: 0,
            status_message: None,
            submitting: false,
            submitted: Vec::new(),
            should_quit: false,
            layout: LayoutRegions::default(),
            pointer_press: None,
            submitter,
            event_tx: None,
        }
    }

    /// Route background work (decoding, submission) through the event loop.
    pub fn with_event_sender(mut self, tx: mpsc::UnboundedSender<Event>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    // ── Status ──────────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: msg.into(),
            created: Instant::now(),
            is_error: false,
        });
    }

    pub fn set_error_message(&mut self, msg: impl Into<String>) {
        let text = msg.into();
        warn!("{}", text);
        self.status_message = Some(StatusMessage {
            text,
            created: Instant::now(),
            is_error: true,
        });
    }

    fn clear_expired_status(&mut self, now: Instant) {
        if let Some(msg) = &self.status_message {
            let ttl = if msg.is_error { ERROR_TTL } else { STATUS_TTL };
            if now.saturating_duration_since(msg.created) > ttl {
                self.status_message = None;
            }
        }
    }

    /// Fire due timers. Called for every event, so timers do not depend on
    /// the input stream going quiet.
    pub fn tick(&mut self, now: Instant) {
        if let Some(preview) = self.preview.as_mut() {
            preview.nav.tick(now);
        }
        self.announcer.tick(now);
        self.clear_expired_status(now);
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ── Staging ─────────────────────────────────────────────────────────

    /// Validate and stage files from disk. Returns how many were added.
    pub fn stage_paths(&mut self, paths: Vec<PathBuf>) -> usize {
        let mut errors = Vec::new();
        let mut pending: Vec<PendingFile> = Vec::new();
        for path in paths {
            match loader::inspect(&path) {
                Ok(p) => pending.push(p),
                Err(e) => errors.push(e.to_string()),
            }
        }

        let report = self
            .rules
            .validate(self.store.len(), pending, |p| &p.candidate);
        errors.extend(report.errors);

        let mut attachments = Vec::with_capacity(report.accepted.len());
        for p in report.accepted {
            match loader::load(p) {
                Ok(a) => attachments.push(a),
                Err(e) => errors.push(e.to_string()),
            }
        }
        self.finish_staging(attachments, errors)
    }

    /// Stage references to already-hosted resources.
    pub fn stage_urls(&mut self, urls: Vec<String>) -> usize {
        let batch: Vec<(Attachment, Candidate)> = urls
            .iter()
            .map(|url| {
                let attachment = loader::remote(url);
                let candidate = Candidate {
                    name: attachment.name.clone(),
                    size_bytes: 0,
                    mime: attachment.mime_hint.clone(),
                };
                (attachment, candidate)
            })
            .collect();
        let report = self.rules.validate(self.store.len(), batch, |(_, c)| c);
        let attachments = report.accepted.into_iter().map(|(a, _)| a).collect();
        self.finish_staging(attachments, report.errors)
    }

    fn finish_staging(&mut self, attachments: Vec<Attachment>, errors: Vec<String>) -> usize {
        let added = attachments.len();
        if added > 0 {
            self.store.add(attachments);
            info!(added, total = self.store.len(), "attachments staged");
        }
        if let Some(err) = errors.last() {
            self.set_error_message(err.clone());
        } else if added > 0 {
            self.set_status_message(format!("Added {} file(s)", added));
        }
        if self.preview.is_some() {
            self.after_list_change(Instant::now());
        }
        added
    }

    /// Bracketed paste: local paths (a file drop) and http(s) links.
    pub fn handle_paste(&mut self, text: &str) {
        let (urls, paths): (Vec<&str>, Vec<&str>) = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .partition(|line| line.starts_with("http://") || line.starts_with("https://"));
        debug!(paths = paths.len(), urls = urls.len(), "paste received");
        if !paths.is_empty() {
            self.stage_paths(loader::parse_paste(&paths.join("\n")));
        }
        if !urls.is_empty() {
            self.stage_urls(urls.into_iter().map(String::from).collect());
        }
    }

    pub fn select_next(&mut self) {
        let len = self.store.len();
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Remove one attachment. Releases its preview URL and re-clamps the
    /// open preview; an emptied session closes the preview.
    pub fn remove_item(&mut self, id: &ItemId, now: Instant) {
        self.cache.release(id, &mut self.registry);
        let Some(removed) = self.store.remove(id) else {
            return;
        };
        // Held or dragged indices point into the old order.
        self.reorder.reset();
        self.pointer_press = None;
        self.announcer
            .announce(format!("Deleted {}", removed.name()), now);
        self.selected = self.selected.min(self.store.len().saturating_sub(1));

        if self.preview.is_some() {
            if !self.store.is_preview_open() {
                self.close_preview();
                return;
            }
            if let Some(preview) = self.preview.as_mut() {
                preview.nav.set_len(self.store.len());
                if let Some(active) = self.store.active_index() {
                    preview.nav.follow(active);
                }
            }
            self.after_list_change(now);
        }
    }

    /// Delete the selected (list) or current (preview) attachment, asking
    /// first when `confirm_delete` is set.
    pub fn request_delete(&mut self, now: Instant) {
        let index = match &self.preview {
            Some(p) => p.nav.current_index(),
            None => self.selected,
        };
        let Some(item) = self.store.get(index) else {
            return;
        };
        let id = item.id.clone();
        if self.config.confirm_delete() {
            self.mode = AppMode::ConfirmDelete {
                id,
                name: item.name().to_string(),
            };
        } else {
            self.remove_item(&id, now);
        }
    }

    pub fn confirm_delete(&mut self, now: Instant) {
        if let AppMode::ConfirmDelete { id, .. } = std::mem::take(&mut self.mode) {
            self.remove_item(&id, now);
        }
    }

    pub fn cancel_dialog(&mut self) {
        self.mode = AppMode::Normal;
    }

    /// Empty the session: close the preview, release every URL, drop items.
    pub fn clear_session(&mut self) {
        self.close_preview();
        self.reorder.reset();
        self.cache.release_all(&mut self.registry);
        self.store.clear();
        self.selected = 0;
    }

    // ── Preview ─────────────────────────────────────────────────────────

    pub fn is_preview_open(&self) -> bool {
        self.preview.is_some()
    }

    /// Mount the preview on the item at `index`.
    pub fn open_preview(&mut self, index: usize, now: Instant) {
        let Some(id) = self.store.get(index).map(|item| item.id.clone()) else {
            return;
        };
        self.reorder.reset();
        self.store.set_active(Some(&id));
        self.store.open_preview();
        self.preview = Some(PreviewState {
            nav: NavigationController::new(index, self.store.len(), self.config.navigation_cooldown()),
            focus: PreviewFocus::Image,
            thumb_scroll: 0,
        });
        self.cache
            .sync(self.store.items(), self.store.generation(), &mut self.registry);
        debug!(
            index,
            urls = self.cache.len(),
            owned = self.cache.owned_count(),
            "preview opened"
        );
        self.on_current_changed(now);
    }

    /// Unmount the preview: cancel its timers, release its URLs.
    pub fn close_preview(&mut self) {
        let Some(mut preview) = self.preview.take() else {
            return;
        };
        preview.nav.cancel();
        self.selected = preview.nav.current_index();
        self.reorder.reset();
        self.announcer.cancel();
        self.pointer_press = None;
        let released = self.cache.release_all(&mut self.registry);
        debug_assert!(self.cache.is_empty());
        let decoded = self.preloader.len();
        self.preloader.clear();
        self.store.close_preview();
        if self.mode != AppMode::Help {
            self.mode = AppMode::Normal;
        }
        debug!(
            released,
            decoded,
            live = self.registry.live_count(),
            "preview closed"
        );
    }

    pub fn current_index(&self) -> Option<usize> {
        self.preview.as_ref().map(|p| p.nav.current_index())
    }

    /// Re-sync everything that hangs off the ordered list.
    fn after_list_change(&mut self, now: Instant) {
        if self.store.is_empty() {
            self.close_preview();
            return;
        }
        self.cache
            .sync(self.store.items(), self.store.generation(), &mut self.registry);
        self.preloader.retain(self.store.items());
        if let Some(preview) = self.preview.as_mut() {
            preview.nav.set_len(self.store.len());
            if let PreviewFocus::Thumbnails { focused } = &mut preview.focus {
                *focused = (*focused).min(self.store.len() - 1);
            }
        }
        self.on_current_changed(now);
    }

    /// The current preview item changed: mark it active and warm decodes.
    fn on_current_changed(&mut self, _now: Instant) {
        let Some(index) = self.current_index() else {
            return;
        };
        if let Some(id) = self.store.get(index).map(|item| item.id.clone()) {
            self.store.set_active(Some(&id));
        }
        self.request_decode(index);
        if self.config.preload_adjacent() {
            for neighbour in Preloader::adjacent(index, self.store.len()) {
                self.request_decode(neighbour);
            }
        }
    }

    fn request_decode(&mut self, index: usize) {
        let Some(item) = self.store.get(index) else {
            return;
        };
        if !item.is_image() {
            return;
        }
        self.cache.ensure(item, &mut self.registry);
        let Some(source) = DecodeSource::resolve(item, &self.cache, &self.registry) else {
            return;
        };
        let id = item.id.clone();
        if !self.preloader.request(&id) {
            return;
        }
        match &self.event_tx {
            Some(tx) => {
                let tx = tx.clone();
                tokio::task::spawn_blocking(move || {
                    let result = source.decode();
                    let _ = tx.send(Event::Decoded { id, result });
                });
            }
            None => {
                let result = source.decode();
                self.preloader.complete(&id, result);
            }
        }
    }

    pub fn handle_decoded(&mut self, id: ItemId, result: crate::error::Result<DecodedImage>) {
        self.preloader.complete(&id, result);
    }

    pub fn navigate(&mut self, direction: Direction, now: Instant) -> bool {
        let moved = self
            .preview
            .as_mut()
            .is_some_and(|p| p.nav.navigate(direction, now));
        if moved {
            self.on_current_changed(now);
        }
        moved
    }

    /// Arrow keys and Escape while the image has focus.
    pub fn navigation_key(&mut self, code: KeyCode, now: Instant) {
        let outcome = match self.preview.as_mut() {
            Some(p) => p.nav.handle_key(code, now),
            None => return,
        };
        match outcome {
            NavOutcome::Navigated => self.on_current_changed(now),
            NavOutcome::Close => self.close_preview(),
            NavOutcome::Ignored => {}
        }
    }

    /// Click inside the image surface at `column` (absolute screen column).
    pub fn click_image(&mut self, column: u16, now: Instant) -> bool {
        let image = self.layout.image;
        let moved = self.preview.as_mut().is_some_and(|p| {
            p.nav
                .click(column.saturating_sub(image.x), image.width, now)
        });
        if moved {
            self.on_current_changed(now);
        }
        moved
    }

    /// Jump to a thumbnail. Ignored while a navigation transition runs.
    pub fn select_thumbnail(&mut self, index: usize, now: Instant) {
        let Some(preview) = self.preview.as_mut() else {
            return;
        };
        if preview.nav.is_transitioning() || index >= self.store.len() {
            return;
        }
        preview.nav.follow(index);
        self.on_current_changed(now);
    }

    pub fn toggle_preview_focus(&mut self) {
        if let Some(preview) = self.preview.as_mut() {
            preview.focus = match preview.focus {
                PreviewFocus::Image => PreviewFocus::Thumbnails {
                    focused: preview.nav.current_index(),
                },
                PreviewFocus::Thumbnails { .. } => PreviewFocus::Image,
            };
        }
    }

    pub fn move_thumbnail_focus(&mut self, direction: Direction) {
        let len = self.store.len();
        if let Some(PreviewState {
            focus: PreviewFocus::Thumbnails { focused },
            ..
        }) = self.preview.as_mut()
        {
            *focused = match direction {
                Direction::Prev => focused.saturating_sub(1),
                Direction::Next => (*focused + 1).min(len.saturating_sub(1)),
            };
        }
    }

    /// Save the current preview item ("download").
    pub fn save_current(&mut self, now: Instant) {
        let Some(item) = self.current_index().and_then(|i| self.store.get(i)) else {
            return;
        };
        let message = match item.kind() {
            ItemKind::BinaryFile { blob, .. } => {
                match export::save_bytes(&self.config.export_dir(), item.name(), blob.bytes()) {
                    Ok(path) => {
                        info!(path = %path.display(), "attachment saved");
                        format!("Downloaded {}", item.name())
                    }
                    Err(e) => {
                        warn!(error = %e, "attachment save failed");
                        "Download failed".to_string()
                    }
                }
            }
            ItemKind::RemoteUrl { url } => format!("{} is hosted at {}", item.name(), url),
        };
        self.announcer.announce(message, now);
    }

    // ── Reordering ──────────────────────────────────────────────────────

    fn with_reorder<R>(
        &mut self,
        now: Instant,
        f: impl FnOnce(&mut ReorderController, &mut SessionTarget<'_>) -> R,
    ) -> R {
        let mut target = SessionTarget {
            store: &mut self.store,
            nav: self.preview.as_mut().map(|p| &mut p.nav),
            announcer: &mut self.announcer,
            selected: &mut self.selected,
            now,
        };
        f(&mut self.reorder, &mut target)
    }

    fn after_move(&mut self, moved: Option<Move>, now: Instant) -> Option<Move> {
        if moved.is_some() && self.preview.is_some() {
            self.after_list_change(now);
        }
        moved
    }

    pub fn pointer_pick_up(&mut self, index: usize, now: Instant) -> bool {
        self.with_reorder(now, |r, t| r.pick_up(index, t))
    }

    pub fn pointer_drop(&mut self, index: usize, now: Instant) -> Option<Move> {
        let moved = self.with_reorder(now, |r, t| r.drop_on(index, t));
        if moved.is_none() && self.preview.is_some() {
            self.on_current_changed(now);
        }
        self.after_move(moved, now)
    }

    pub fn pointer_cancel(&mut self) {
        self.reorder.cancel_drag();
    }

    /// Space on the item at `index`.
    pub fn keyboard_activate(&mut self, index: usize, now: Instant) -> Option<Move> {
        let moved = self.with_reorder(now, |r, t| r.activate(index, t));
        if moved.is_some() {
            self.follow_focus();
        }
        self.after_move(moved, now)
    }

    pub fn keyboard_move(&mut self, direction: Direction, now: Instant) -> Option<Move> {
        let moved = self.with_reorder(now, |r, t| r.move_picked(direction, t));
        self.follow_focus();
        self.after_move(moved, now)
    }

    pub fn keyboard_escape(&mut self, now: Instant) -> bool {
        self.with_reorder(now, |r, t| r.escape(t))
    }

    /// Keep the focused thumbnail on the held (or just dropped) item.
    fn follow_focus(&mut self) {
        let index = self
            .reorder
            .picked_up_index()
            .or_else(|| self.current_index());
        if let (Some(index), Some(preview)) = (index, self.preview.as_mut()) {
            if let PreviewFocus::Thumbnails { focused } = &mut preview.focus {
                *focused = index;
            }
        }
    }

    // ── Submission ──────────────────────────────────────────────────────

    pub fn submit(&mut self) {
        if self.submitting {
            return;
        }
        if self.store.is_empty() {
            self.set_error_message("Nothing to submit");
            return;
        }
        let manifest = Manifest::from_items(self.store.items());
        self.submitted = manifest.attachments.iter().map(|e| e.id.clone()).collect();
        match self.event_tx.clone() {
            Some(tx) => {
                self.submitting = true;
                self.set_status_message("Submitting...");
                submit::spawn_submit(self.submitter.clone(), manifest, tx);
            }
            None => {
                let outcome = submit::run_submit(self.submitter.as_ref(), &manifest);
                self.handle_submitted(outcome);
            }
        }
    }

    pub fn handle_submitted(&mut self, outcome: SubmitOutcome) {
        self.submitting = false;
        let submitted = std::mem::take(&mut self.submitted);
        if outcome.success {
            self.remove_submitted(&submitted);
            self.set_status_message(outcome.message);
        } else {
            self.set_error_message(outcome.message);
        }
    }

    /// Drop what a finished submission carried. Attachments staged while it
    /// was in flight stay in the session.
    fn remove_submitted(&mut self, submitted: &[ItemId]) {
        self.close_preview();
        self.reorder.reset();
        for id in submitted {
            self.cache.release(id, &mut self.registry);
            self.store.remove(id);
        }
        self.selected = self.selected.min(self.store.len().saturating_sub(1));
        debug!(
            removed = submitted.len(),
            remaining = self.store.len(),
            "submitted attachments removed"
        );
    }

    pub fn open_help(&mut self) {
        self.help_scroll = 0;
        self.mode = AppMode::Help;
    }

    pub fn scroll_help(&mut self, down: bool) {
        let max = HelpOverlay::total_lines().saturating_sub(1);
        self.help_scroll = if down {
            (self.help_scroll + 1).min(max)
        } else {
            self.help_scroll.saturating_sub(1)
        };
    }
}
