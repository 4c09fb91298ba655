use crate::types::{BatchReport, CollectionError, FileInput, ImageRecord, Result};

/// Decode a batch of candidate files into records.
///
/// Non-image inputs are rejected individually before any decoding starts;
/// if nothing survives the filter the batch fails with
/// [`CollectionError::BatchEmpty`]. The remaining files are decoded
/// concurrently on the blocking pool and rejoined by input index, so the
/// resulting order always matches the caller's order no matter how the
/// decodes interleave. A file that fails to decode is logged and excluded
/// without aborting the rest of the batch.
pub(crate) async fn decode_batch(files: Vec<FileInput>) -> Result<(Vec<ImageRecord>, BatchReport)> {
    let total = files.len();
    let candidates: Vec<FileInput> = files
        .into_iter()
        .filter(|file| {
            if file.is_image() {
                true
            } else {
                log::debug!("rejecting {} ({})", file.name, file.content_type);
                false
            }
        })
        .collect();
    let rejected = total - candidates.len();

    if candidates.is_empty() {
        return Err(CollectionError::BatchEmpty);
    }

    // Fan out one blocking decode task per file, then fan in by awaiting the
    // handles in input order.
    let mut handles = Vec::with_capacity(candidates.len());
    for file in candidates {
        handles.push(tokio::task::spawn_blocking(move || {
            let decoded = image::load_from_memory(&file.bytes);
            (file.name, decoded)
        }));
    }

    let mut records = Vec::with_capacity(handles.len());
    let mut failed = 0;
    for handle in handles {
        let (name, decoded) = handle.await?;
        match decoded {
            Ok(pixels) => records.push(ImageRecord::new(name, pixels)),
            Err(err) => {
                log::warn!("skipping {name}: {err}");
                failed += 1;
            }
        }
    }

    let report = BatchReport {
        added: records.len(),
        rejected,
        failed,
    };
    Ok((records, report))
}
