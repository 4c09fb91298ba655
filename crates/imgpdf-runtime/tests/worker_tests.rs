use image::DynamicImage;
use imgpdf_runtime::{AssemblyOptions, Command, FileInput, Update, worker_task};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::new_rgb8(width, height);
    let mut bytes = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Png,
    )
    .unwrap();
    bytes
}

fn image_file(name: &str) -> FileInput {
    FileInput {
        name: name.to_string(),
        content_type: "image/png".to_string(),
        bytes: png_bytes(8, 8),
    }
}

fn options_into(dir: &Path, filename: &str, page_delay_ms: u64) -> Command {
    Command::Generate {
        options: AssemblyOptions {
            filename: filename.to_string(),
            page_delay_ms,
            ..Default::default()
        },
        out_dir: dir.to_path_buf(),
    }
}

struct Harness {
    command_tx: mpsc::UnboundedSender<Command>,
    update_rx: mpsc::UnboundedReceiver<Update>,
}

impl Harness {
    fn spawn() -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        tokio::spawn(worker_task(command_rx, update_tx));
        Self {
            command_tx,
            update_rx,
        }
    }

    fn send(&self, cmd: Command) {
        self.command_tx.send(cmd).unwrap();
    }

    async fn recv(&mut self) -> Update {
        timeout(Duration::from_secs(30), self.update_rx.recv())
            .await
            .expect("timed out waiting for an update")
            .expect("worker hung up")
    }

    /// Receive until `pred` matches, returning everything seen on the way
    async fn recv_until(&mut self, pred: impl Fn(&Update) -> bool) -> Vec<Update> {
        let mut seen = Vec::new();
        loop {
            let update = self.recv().await;
            let done = pred(&update);
            seen.push(update);
            if done {
                return seen;
            }
        }
    }
}

#[tokio::test]
async fn test_add_files_reports_change_and_success() {
    let mut harness = Harness::spawn();
    harness.send(Command::AddFiles {
        files: vec![image_file("a.png"), image_file("b.png")],
    });

    let update = harness.recv().await;
    assert!(matches!(
        update,
        Update::CollectionChanged {
            count: 2,
            selected: 0
        }
    ));
    let update = harness.recv().await;
    assert!(matches!(update, Update::Success { .. }));
}

#[tokio::test]
async fn test_non_image_batch_reports_error() {
    let mut harness = Harness::spawn();
    harness.send(Command::AddFiles {
        files: vec![FileInput {
            name: "a.txt".to_string(),
            content_type: "text/plain".to_string(),
            bytes: b"text".to_vec(),
        }],
    });

    let update = harness.recv().await;
    match update {
        Update::Error { message } => assert!(message.contains("no valid image")),
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_on_empty_collection_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = Harness::spawn();
    harness.send(options_into(dir.path(), "never", 0));

    let updates = harness
        .recv_until(|u| matches!(u, Update::Error { .. }))
        .await;
    assert!(!updates.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_generate_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = Harness::spawn();
    harness.send(Command::AddFiles {
        files: vec![image_file("a.png"), image_file("b.png")],
    });
    harness.send(options_into(dir.path(), "album", 0));

    let updates = harness
        .recv_until(|u| matches!(u, Update::Success { message } if message.contains("album.pdf")))
        .await;
    assert!(
        updates
            .iter()
            .any(|u| matches!(u, Update::Progress { .. })),
        "expected at least one progress update"
    );

    let bytes = std::fs::read(dir.path().join("album.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_operations_while_assembling_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = Harness::spawn();
    harness.send(Command::AddFiles {
        files: vec![image_file("a.png"), image_file("b.png"), image_file("c.png")],
    });
    // Pace the pages so the next command arrives while assembling
    harness.send(options_into(dir.path(), "busy", 50));
    harness.send(Command::AddFiles {
        files: vec![image_file("d.png")],
    });

    let updates = harness
        .recv_until(|u| matches!(u, Update::Success { message } if message.contains("busy.pdf")))
        .await;
    assert!(
        updates
            .iter()
            .any(|u| matches!(u, Update::Error { message } if message.contains("in progress"))),
        "expected the second batch to be rejected"
    );

    // The rejected batch never landed: once the worker reaps the finished
    // task, a single add lands on top of the original 3 records. Retry in
    // case the reap races the first re-add.
    let mut count = None;
    for _ in 0..50 {
        harness.send(Command::AddFiles {
            files: vec![image_file("e.png")],
        });
        let updates = harness
            .recv_until(|u| {
                matches!(u, Update::CollectionChanged { .. }) || matches!(u, Update::Error { .. })
            })
            .await;
        if let Some(Update::CollectionChanged { count: c, .. }) = updates.last() {
            count = Some(*c);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(count, Some(4));
}

#[tokio::test]
async fn test_cancel_assembly_discards_partial_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut harness = Harness::spawn();
    let files: Vec<_> = (0..5).map(|i| image_file(&format!("p{i}.png"))).collect();
    harness.send(Command::AddFiles { files });
    harness
        .recv_until(|u| matches!(u, Update::Success { .. }))
        .await;

    harness.send(options_into(dir.path(), "partial", 100));
    // Wait until the pipeline is demonstrably running, then cancel
    harness
        .recv_until(|u| matches!(u, Update::Progress { .. }))
        .await;
    harness.send(Command::CancelAssembly);

    let updates = harness
        .recv_until(|u| matches!(u, Update::AssemblyCanceled { .. }))
        .await;
    match updates.last() {
        Some(Update::AssemblyCanceled { pages_composed }) => {
            assert!(*pages_composed < 5);
        }
        other => panic!("expected AssemblyCanceled, got {other:?}"),
    }
    // The save step never ran
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_cancel_when_idle_is_a_noop() {
    let mut harness = Harness::spawn();
    harness.send(Command::CancelAssembly);
    harness.send(Command::AddFiles {
        files: vec![image_file("a.png")],
    });

    // The stray cancel produced no update and did not poison the session
    let update = harness.recv().await;
    assert!(matches!(
        update,
        Update::CollectionChanged { count: 1, .. }
    ));
}
