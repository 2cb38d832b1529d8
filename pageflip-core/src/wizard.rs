//! The book-creation wizard
//!
//! A [`WizardSession`] owns the single in-progress [`WizardDraft`] and is
//! passed explicitly to each step: select images and details, arrange the
//! pages, upload, then preview and submit.

use crate::error::{Result, WizardError};
use crate::reorder::{HitTest, Point, ReorderEngine};
use crate::service::BookService;
use crate::staging::{PreviewRegistry, SelectedFile, StagedImage};
use crate::types::{Book, Category, NewBook, OwnerId};
use crate::upload::{UploadPipeline, UploadProgress};

/// Wizard pages, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    /// Pick images and enter title, description and category
    Select,
    /// Reorder pages, then upload
    Arrange,
    /// Flip through the uploaded pages and save the book
    Preview,
}

/// Descriptive fields entered on the first step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDetails {
    pub title: String,
    pub description: String,
    pub category: Category,
}

/// Partial update merged into the draft by [`WizardSession::set_draft`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Category>,
}

/// The book being assembled. Never persisted directly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WizardDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    /// Pages in final order
    pub images: Vec<StagedImage>,
    /// Set while the upload pipeline is running
    pub uploading: bool,
}

impl WizardDraft {
    fn from_details(details: BookDetails) -> Self {
        Self {
            title: details.title,
            description: details.description,
            category: details.category,
            ..Self::default()
        }
    }

    /// True once every page carries a remote URL
    pub fn is_uploaded(&self) -> bool {
        !self.images.is_empty() && self.images.iter().all(StagedImage::is_uploaded)
    }

    /// Remote URLs in page order, if every page has been uploaded
    pub fn uploaded_urls(&self) -> Option<Vec<String>> {
        self.images
            .iter()
            .map(|image| image.remote_url.clone())
            .collect::<Option<Vec<_>>>()
            .filter(|urls| !urls.is_empty())
    }

    /// Build the record-service request for this draft
    pub fn to_new_book(&self) -> std::result::Result<NewBook, WizardError> {
        let images = self.uploaded_urls().ok_or(WizardError::NotUploaded)?;
        Ok(NewBook {
            title: Some(self.title.clone()),
            description: Some(self.description.clone()),
            category: Some(self.category.as_str().to_string()),
            images: Some(images),
        })
    }

    /// Forget uploaded URLs after the page list changes
    fn invalidate_uploads(&mut self) {
        for image in &mut self.images {
            image.remote_url = None;
        }
    }
}

/// Clears the draft's uploading flag however the upload ends
struct UploadingFlag<'a>(&'a mut bool);

impl<'a> UploadingFlag<'a> {
    fn raise(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for UploadingFlag<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

/// The draft, or `NoDraft`
fn existing(draft: &mut Option<WizardDraft>) -> std::result::Result<&mut WizardDraft, WizardError> {
    draft.as_mut().ok_or(WizardError::NoDraft)
}

/// The draft, provided it is not mid-upload
fn editable(draft: &mut Option<WizardDraft>) -> std::result::Result<&mut WizardDraft, WizardError> {
    let draft = existing(draft)?;
    if draft.uploading {
        return Err(WizardError::UploadInProgress);
    }
    Ok(draft)
}

/// Session-scoped wizard state
#[derive(Debug, Default)]
pub struct WizardSession {
    draft: Option<WizardDraft>,
    previews: PreviewRegistry,
    reorder: ReorderEngine,
}

impl WizardSession {
    pub fn new(previews: PreviewRegistry) -> Self {
        Self {
            draft: None,
            previews,
            reorder: ReorderEngine::new(),
        }
    }

    /// The draft in progress, if any
    pub fn draft(&self) -> Option<&WizardDraft> {
        self.draft.as_ref()
    }

    /// Registry the session allocates preview handles from
    pub fn previews(&self) -> &PreviewRegistry {
        &self.previews
    }

    /// Begin a new book, replacing any draft in progress
    pub fn start(&mut self, details: BookDetails) -> &mut WizardDraft {
        self.discard();
        self.draft.insert(WizardDraft::from_details(details))
    }

    /// Merge fields into the draft, creating it if needed
    pub fn set_draft(&mut self, update: DraftUpdate) -> &mut WizardDraft {
        let draft = self.draft.get_or_insert_with(WizardDraft::default);
        if let Some(title) = update.title {
            draft.title = title;
        }
        if let Some(description) = update.description {
            draft.description = description;
        }
        if let Some(category) = update.category {
            draft.category = category;
        }
        draft
    }

    /// Stage files after the existing pages, allocating a preview for each
    pub fn add_images(&mut self, files: impl IntoIterator<Item = SelectedFile>) -> Result<usize> {
        if self.draft.as_ref().is_some_and(|d| d.uploading) {
            return Err(WizardError::UploadInProgress.into());
        }
        let previews = self.previews.clone();
        let draft = self.draft.get_or_insert_with(WizardDraft::default);

        let before = draft.images.len();
        draft.images.extend(
            files
                .into_iter()
                .map(|file| StagedImage::new(file, previews.allocate())),
        );
        draft.invalidate_uploads();
        Ok(draft.images.len() - before)
    }

    /// Unstage the page at `index`, releasing its preview
    pub fn remove_image(&mut self, index: usize) -> Result<SelectedFile> {
        let draft = editable(&mut self.draft)?;
        let len = draft.images.len();
        if index >= len {
            return Err(WizardError::IndexOutOfRange { index, len }.into());
        }

        let image = draft.images.remove(index);
        draft.invalidate_uploads();
        self.previews.revoke(&image.preview);
        Ok(image.file)
    }

    /// Pointer or touch press on the page at `index`
    ///
    /// A rejected press still clears any earlier drag.
    pub fn begin_drag(&mut self, index: usize) -> Result<()> {
        self.reorder.cancel();
        let len = editable(&mut self.draft)?.images.len();
        if index >= len {
            return Err(WizardError::IndexOutOfRange { index, len }.into());
        }
        self.reorder.begin_drag(index);
        Ok(())
    }

    /// Pointer release over the page at `target`
    pub fn drop_at(&mut self, target: usize) -> Result<bool> {
        let draft = match editable(&mut self.draft) {
            Ok(draft) => draft,
            Err(e) => {
                self.reorder.cancel();
                return Err(e.into());
            }
        };
        let moved = self.reorder.drop_at(&mut draft.images, target);
        if moved {
            draft.invalidate_uploads();
        }
        Ok(moved)
    }

    /// Touch release at `point`, hit-tested against the rendered layout
    pub fn drop_at_point<H: HitTest + ?Sized>(&mut self, point: Point, layout: &H) -> Result<bool> {
        let draft = match editable(&mut self.draft) {
            Ok(draft) => draft,
            Err(e) => {
                self.reorder.cancel();
                return Err(e.into());
            }
        };
        let moved = self.reorder.drop_at_point(&mut draft.images, point, layout);
        if moved {
            draft.invalidate_uploads();
        }
        Ok(moved)
    }

    /// Move one page in a single gesture
    pub fn move_image(&mut self, source: usize, destination: usize) -> Result<bool> {
        self.begin_drag(source)?;
        self.drop_at(destination)
    }

    /// Upload every staged page in its current order
    pub async fn upload(&mut self, pipeline: &UploadPipeline) -> Result<Vec<String>> {
        self.upload_with_progress(pipeline, |_| {}).await
    }

    /// Upload every staged page, reporting progress after each one
    ///
    /// On failure the draft is left as it was, minus the uploading flag, so
    /// the upload can be offered again.
    pub async fn upload_with_progress<F>(
        &mut self,
        pipeline: &UploadPipeline,
        on_progress: F,
    ) -> Result<Vec<String>>
    where
        F: FnMut(UploadProgress),
    {
        self.reorder.cancel();
        let draft = editable(&mut self.draft)?;
        if draft.images.is_empty() {
            return Err(WizardError::NoImages.into());
        }

        let urls = {
            let _flag = UploadingFlag::raise(&mut draft.uploading);
            pipeline
                .run_with_progress(&draft.title, &draft.images, on_progress)
                .await?
        };

        for (image, url) in draft.images.iter_mut().zip(&urls) {
            image.remote_url = Some(url.clone());
        }
        Ok(urls)
    }

    /// Save the uploaded draft as a book
    ///
    /// The draft is discarded only once the book is stored; on any error it
    /// stays intact for a retry.
    pub fn submit(&mut self, service: &BookService, caller: Option<&OwnerId>) -> Result<Book> {
        let request = {
            let draft = self.draft.as_ref().ok_or(WizardError::NoDraft)?;
            if draft.uploading {
                return Err(WizardError::UploadInProgress.into());
            }
            draft.to_new_book()?
        };

        match service.create(caller, request) {
            Ok(book) => {
                self.discard();
                Ok(book)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Saving book failed, keeping draft");
                Err(e)
            }
        }
    }

    /// Drop the draft and release its previews
    pub fn discard(&mut self) {
        self.reorder.cancel();
        if let Some(draft) = self.draft.take() {
            for image in &draft.images {
                self.previews.revoke(&image.preview);
            }
        }
    }

    /// The step to render when `requested` is asked for
    ///
    /// Any step whose prerequisites are missing sends the user back to the start.
    pub fn resolve_step(&self, requested: Step) -> Step {
        let ready = match (requested, self.draft.as_ref()) {
            (Step::Select, _) => true,
            (_, None) => false,
            (Step::Arrange, Some(draft)) => !draft.images.is_empty(),
            (Step::Preview, Some(draft)) => draft.is_uploaded(),
        };
        if ready {
            requested
        } else {
            Step::Select
        }
    }
}
