use imgpdf_assembly::{AssemblyOptions, AssemblyOutcome, CancelFlag, generate};
use imgpdf_collection::{BatchReport, FileInput, ImageCollection};
use std::path::PathBuf;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::Update;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("another operation is in progress")]
    Busy,
    #[error(transparent)]
    Collection(#[from] imgpdf_collection::CollectionError),
    #[error(transparent)]
    Assembly(#[from] imgpdf_assembly::AssemblyError),
}

/// Lifecycle of a session: at most one long-running operation at a time.
///
/// Starting a batch add or an assembly while not `Idle` is rejected, never
/// queued; the state returns to `Idle` on every exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    AddingFiles,
    Assembling,
}

/// Handle to a spawned assembly: the shared cancellation flag plus the task
/// itself, which the worker awaits to restore the session to idle.
pub struct AssemblyTask {
    pub cancel: CancelFlag,
    pub handle: JoinHandle<()>,
}

/// Owned controller for one editing session.
///
/// Holds the live collection and the session state, applies mutations, and
/// emits [`Update`] notifications for a presentation layer to observe. The
/// session never renders anything itself.
pub struct Session {
    collection: ImageCollection,
    state: SessionState,
    update_tx: mpsc::UnboundedSender<Update>,
}

impl Session {
    pub fn new(update_tx: mpsc::UnboundedSender<Update>) -> Self {
        Self {
            collection: ImageCollection::new(),
            state: SessionState::Idle,
            update_tx,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn collection(&self) -> &ImageCollection {
        &self.collection
    }

    fn send(&self, update: Update) {
        let _ = self.update_tx.send(update);
    }

    fn notify_changed(&self) {
        self.send(Update::CollectionChanged {
            count: self.collection.len(),
            selected: self.collection.selected_count(),
        });
    }

    fn notify_success(&self, message: String) {
        self.send(Update::Success { message });
    }

    fn notify_error(&self, message: String) {
        self.send(Update::Error { message });
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle => Ok(()),
            _ => {
                self.notify_error(SessionError::Busy.to_string());
                Err(SessionError::Busy)
            }
        }
    }

    /// Decode and append a batch of files.
    ///
    /// Rejected while another operation is in flight. The busy state is
    /// restored before the result is surfaced, whether the batch succeeded
    /// or not.
    pub async fn add_files(&mut self, files: Vec<FileInput>) -> Result<BatchReport, SessionError> {
        self.ensure_idle()?;
        self.state = SessionState::AddingFiles;
        let result = self.collection.add_batch(files).await;
        self.state = SessionState::Idle;

        match result {
            Ok(report) => {
                self.notify_changed();
                self.notify_success(format!("Added {} image(s)", report.added));
                Ok(report)
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn remove(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        match self.collection.remove(index) {
            Ok(record) => {
                self.notify_changed();
                self.notify_success(format!("Removed \"{}\"", record.name));
                Ok(())
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn remove_selected(&mut self) -> Result<usize, SessionError> {
        self.ensure_idle()?;
        match self.collection.remove_selected() {
            Ok(removed) => {
                self.notify_changed();
                self.notify_success(format!("Removed {removed} image(s)"));
                Ok(removed)
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn remove_all(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.collection.remove_all();
        self.notify_changed();
        self.notify_success("All images removed".to_string());
        Ok(())
    }

    pub fn toggle_select(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        match self.collection.toggle_select(index) {
            Ok(_) => {
                self.notify_changed();
                Ok(())
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn toggle_select_all(&mut self) -> Result<bool, SessionError> {
        self.ensure_idle()?;
        let selected = self.collection.toggle_select_all();
        self.notify_changed();
        Ok(selected)
    }

    pub fn rotate(&mut self, index: usize) -> Result<(), SessionError> {
        self.ensure_idle()?;
        match self.collection.rotate(index) {
            Ok(()) => {
                self.notify_changed();
                Ok(())
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn rotate_selected(&mut self) -> Result<usize, SessionError> {
        self.ensure_idle()?;
        match self.collection.rotate_selected() {
            Ok(rotated) => {
                self.notify_changed();
                Ok(rotated)
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn reorder(&mut self, new_order: &[usize]) -> Result<(), SessionError> {
        self.ensure_idle()?;
        match self.collection.reorder(new_order) {
            Ok(()) => {
                self.notify_changed();
                Ok(())
            }
            Err(err) => {
                self.notify_error(err.to_string());
                Err(err.into())
            }
        }
    }

    pub fn sort(&mut self, ascending: bool) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.collection.sort(ascending);
        self.notify_changed();
        Ok(())
    }

    /// Snapshot the collection and spawn the assembly pipeline.
    ///
    /// The session stays `Assembling` until the caller observes completion
    /// of the returned task and calls [`Session::finish_assembly`]. Failures
    /// inside the task are logged in full but surfaced to observers as a
    /// generic message.
    pub fn begin_assembly(
        &mut self,
        options: AssemblyOptions,
        out_dir: PathBuf,
    ) -> Result<AssemblyTask, SessionError> {
        self.ensure_idle()?;

        let snapshot = self.collection.snapshot();
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let update_tx = self.update_tx.clone();

        let handle = tokio::spawn(async move {
            let progress = |percent: f32, message: String| {
                let _ = update_tx.send(Update::Progress { percent, message });
            };
            match generate(snapshot, &options, &out_dir, &flag, progress).await {
                Ok(AssemblyOutcome::Completed {
                    filename,
                    page_count,
                }) => {
                    let _ = update_tx.send(Update::Success {
                        message: format!("PDF saved as \"{filename}\" ({page_count} pages)"),
                    });
                }
                Ok(AssemblyOutcome::Canceled { pages_composed }) => {
                    let _ = update_tx.send(Update::AssemblyCanceled { pages_composed });
                }
                Err(err) => {
                    log::warn!("assembly failed: {err}");
                    let _ = update_tx.send(Update::Error {
                        message: "Failed to generate PDF. Please try again".to_string(),
                    });
                }
            }
        });

        self.state = SessionState::Assembling;
        Ok(AssemblyTask { cancel, handle })
    }

    /// Restore the session to idle once the assembly task has finished
    pub fn finish_assembly(&mut self) {
        self.state = SessionState::Idle;
    }
}
