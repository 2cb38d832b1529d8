//! Create command implementation

use crate::{LibraryArgs, PageMove};
use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pageflip_core::storage::LocalStorage;
use pageflip_core::{BookDetails, PreviewRegistry, SelectedFile, Step, UploadPipeline, WizardSession};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn read_page(path: &Path) -> Result<SelectedFile> {
    let data =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(SelectedFile::new(name, data))
}

/// Run the create command
pub async fn create(
    library: &LibraryArgs,
    details: BookDetails,
    files: &[PathBuf],
    moves: &[PageMove],
    public_url: &str,
    json: bool,
) -> Result<()> {
    let owner = library.owner();
    let service = library.service()?;
    let storage = LocalStorage::new(library.objects_dir(), public_url);
    let pipeline = UploadPipeline::new(Arc::new(storage)).for_owner(&owner);

    let pages = files
        .iter()
        .map(|path| read_page(path.as_path()))
        .collect::<Result<Vec<_>>>()?;

    let mut session = WizardSession::new(PreviewRegistry::new());
    session.start(details);
    session.add_images(pages)?;

    if session.resolve_step(Step::Arrange) != Step::Arrange {
        bail!("No pages to arrange");
    }

    for m in moves {
        let count = session.draft().map_or(0, |d| d.images.len());
        if m.from > count || m.to > count {
            bail!(
                "Cannot move page {} to {}: the book has {} pages",
                m.from,
                m.to,
                count
            );
        }
        tracing::debug!(from = m.from, to = m.to, "Moving page");
        session.move_image(m.from - 1, m.to - 1)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
            .context("Invalid progress template")?
            .progress_chars("##-"),
    );
    if json {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let uploaded = session
        .upload_with_progress(&pipeline, |progress| {
            pb.set_position(progress.completed as u64);
            pb.set_message(progress.key);
        })
        .await;
    pb.finish_and_clear();
    let urls = uploaded.context("Uploading pages failed")?;

    if session.resolve_step(Step::Preview) != Step::Preview {
        bail!("Pages were not uploaded");
    }

    let book = session
        .submit(&service, Some(&owner))
        .context("Saving book failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&book)?);
        return Ok(());
    }

    println!("Created book {} \"{}\"", book.id, book.title);
    println!("  Category: {}", book.category.as_str());
    println!("  Pages:    {}", urls.len());
    for (i, url) in urls.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, url);
    }

    Ok(())
}
