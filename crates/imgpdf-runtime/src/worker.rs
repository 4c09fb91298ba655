use tokio::sync::mpsc;

use crate::session::{AssemblyTask, Session};
use crate::{Command, Update};

/// Async worker task that serializes session operations and sends updates.
///
/// Commands are processed in arrival order. While an assembly task is in
/// flight the loop keeps receiving, so `CancelAssembly` stays responsive;
/// anything that would start a second long-running operation is rejected by
/// the session's state machine.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    update_tx: mpsc::UnboundedSender<Update>,
) {
    let mut session = Session::new(update_tx);
    let mut assembly: Option<AssemblyTask> = None;

    loop {
        let event = match assembly.as_mut() {
            // Prefer reaping a finished assembly over starting the next
            // command, so the idle state is restored as soon as possible
            Some(task) => tokio::select! {
                biased;
                _ = &mut task.handle => Event::AssemblyDone,
                cmd = command_rx.recv() => Event::Command(cmd),
            },
            None => Event::Command(command_rx.recv().await),
        };

        match event {
            Event::AssemblyDone => {
                assembly = None;
                session.finish_assembly();
            }
            Event::Command(Some(cmd)) => {
                process_command(cmd, &mut session, &mut assembly).await;
            }
            Event::Command(None) => break,
        }
    }

    // The command side hung up; wind down any in-flight assembly
    if let Some(task) = assembly.take() {
        task.cancel.cancel();
        let _ = task.handle.await;
    }
}

enum Event {
    AssemblyDone,
    Command(Option<Command>),
}

async fn process_command(cmd: Command, session: &mut Session, assembly: &mut Option<AssemblyTask>) {
    match cmd {
        Command::AddFiles { files } => {
            let _ = session.add_files(files).await;
        }
        Command::Remove { index } => {
            let _ = session.remove(index);
        }
        Command::RemoveSelected => {
            let _ = session.remove_selected();
        }
        Command::RemoveAll => {
            let _ = session.remove_all();
        }
        Command::ToggleSelect { index } => {
            let _ = session.toggle_select(index);
        }
        Command::ToggleSelectAll => {
            let _ = session.toggle_select_all();
        }
        Command::Rotate { index } => {
            let _ = session.rotate(index);
        }
        Command::RotateSelected => {
            let _ = session.rotate_selected();
        }
        Command::Reorder { new_order } => {
            let _ = session.reorder(&new_order);
        }
        Command::Sort { ascending } => {
            let _ = session.sort(ascending);
        }
        Command::Generate { options, out_dir } => {
            if let Ok(task) = session.begin_assembly(options, out_dir) {
                *assembly = Some(task);
            }
        }
        Command::CancelAssembly => {
            // Advisory: a no-op when nothing is assembling
            if let Some(task) = assembly {
                task.cancel.cancel();
            }
        }
    }
}
