use anyhow::{anyhow, Context, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::credentials::{ConfigCredentials, CredentialStore};
use crate::file_utils::{DirectorySink, FileManager, FileSink};
use crate::pagination::{PageView, TranslatedBuffer};
use crate::subtitle_processor::{merge_bilingual, to_srt_string, SubtitleCollection, SubtitleEntry};
use crate::translation::{
    DocumentTranslator, RetryPolicy, Sleeper, TranslateFileStatus, TranslationService,
};

// @module: Application controller for one loaded subtitle document

/// Which version of the document to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFlavor {
    Original,
    Translated,
    /// Original line above the translated line in every cue
    Bilingual,
}

impl ExportFlavor {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Original => "original.srt",
            Self::Translated => "translated.srt",
            Self::Bilingual => "translated_bilingual.srt",
        }
    }
}

/// What the CLI asks for on one input
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Translate only this zero-based page instead of the whole file
    pub page: Option<usize>,
    /// Also write the bilingual export
    pub bilingual: bool,
    pub force_overwrite: bool,
}

/// Main application controller for subtitle translation
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,
    translator: DocumentTranslator,
    credentials: Arc<dyn CredentialStore>,
    // @field: Loaded document, None until load_bytes succeeds
    document: Option<SubtitleCollection>,
    buffer: TranslatedBuffer,
    view: PageView,
    show_progress: bool,
}

impl Controller {
    // @method: Create a controller talking HTTP to the configured endpoint
    pub fn with_config(config: Config) -> Result<Self> {
        let service = TranslationService::from_config(&config.translation)
            .context("Failed to create translation service")?;
        let credentials = Arc::new(ConfigCredentials::from_env(&config.translation));
        Ok(Self::new(config, service, credentials))
    }

    /// Create a controller over an existing service and credential store
    pub fn new(config: Config, service: TranslationService, credentials: Arc<dyn CredentialStore>) -> Self {
        let page_size = config.batching.page_size;
        let translator = DocumentTranslator::new(service)
            .with_policy(RetryPolicy::from_config(&config.batching))
            .with_page_size(page_size);

        Self {
            config,
            translator,
            credentials,
            document: None,
            buffer: TranslatedBuffer::new(page_size),
            view: PageView::new(0, page_size),
            show_progress: false,
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.translator = self.translator.with_sleeper(sleeper);
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn file_name(&self) -> Option<&str> {
        self.document.as_ref().map(|doc| doc.source_name.as_str())
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        self.document.as_ref().map_or(&[], |doc| doc.entries.as_slice())
    }

    pub fn translated(&self) -> &TranslatedBuffer {
        &self.buffer
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut PageView {
        &mut self.view
    }

    pub fn status(&self) -> TranslateFileStatus {
        self.translator.status()
    }

    /// Entries of the page on screen
    pub fn current_entries(&self) -> &[SubtitleEntry] {
        self.view.current_entries(self.entries())
    }

    /// Load a subtitle file, replacing whatever was loaded before.
    ///
    /// On failure the previous document stays loaded.
    pub fn load_bytes(&mut self, file_name: &str, bytes: &[u8]) -> Result<usize> {
        let collection = SubtitleCollection::from_bytes(file_name, bytes, self.config.input.max_file_size)
            .with_context(|| format!("Failed to load {}", file_name))?;

        let count = collection.entries.len();
        info!("Loaded {} with {} entries", file_name, count);

        self.view = PageView::new(count, self.config.batching.page_size);
        self.buffer = TranslatedBuffer::new(self.config.batching.page_size);
        self.document = Some(collection);
        Ok(count)
    }

    /// Translate the page on screen in a single request, without retrying.
    ///
    /// A failure leaves the translated buffer untouched.
    pub async fn translate_current_page(&mut self) -> Result<Vec<SubtitleEntry>> {
        let page_index = self.view.current_page();
        let page = self.view.current_entries(self.entries());
        if page.is_empty() {
            return Err(anyhow!("Nothing to translate"));
        }

        let translated = self
            .translator
            .service()
            .translate_batch(page, &self.config.target_language, self.credentials.as_ref())
            .await
            .with_context(|| format!("Translate failed for page {}", page_index + 1))?;

        self.buffer.place_batch(page_index, &translated);
        debug!("Placed {} translated entries on page {}", translated.len(), page_index + 1);
        Ok(translated)
    }

    /// Translate the whole document batch by batch.
    ///
    /// Finished batches land in the translated buffer as they arrive, so they
    /// survive a later failure.
    pub async fn translate_file(&mut self) -> Result<usize> {
        self.translate_file_with(&MultiProgress::new()).await
    }

    async fn translate_file_with(&mut self, multi_progress: &MultiProgress) -> Result<usize> {
        let Some(document) = self.document.as_ref() else {
            return Err(anyhow!("No subtitle loaded"));
        };

        let page_count = self.view.page_count();
        let progress_bar = if self.show_progress {
            multi_progress.add(ProgressBar::new(page_count as u64))
        } else {
            ProgressBar::hidden()
        };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=>-"));
        progress_bar.set_message(document.source_name.clone());

        let buffer = &mut self.buffer;
        let pb = progress_bar.clone();
        let mut on_batch_done = |batch_index: usize, batch: &[SubtitleEntry]| {
            buffer.place_batch(batch_index, batch);
            pb.set_position(batch_index as u64 + 1);
        };

        let result = self
            .translator
            .translate_document(
                &document.entries,
                &self.config.target_language,
                self.credentials.as_ref(),
                &mut on_batch_done,
            )
            .await;
        progress_bar.finish_and_clear();

        match result {
            Ok(translated) => {
                info!("Translate file successfully: {} entries", translated.len());
                Ok(translated.len())
            }
            Err(e) => {
                error!("Translate file failed: {}", e);
                Err(anyhow!(e).context("translate file failed"))
            }
        }
    }

    /// Render one export flavor as SRT text
    pub fn render(&self, flavor: ExportFlavor) -> Result<String> {
        let entries = match flavor {
            ExportFlavor::Original => self.entries().to_vec(),
            ExportFlavor::Translated => self.buffer.entries(),
            ExportFlavor::Bilingual => merge_bilingual(&self.buffer.entries(), self.entries()),
        };
        if entries.is_empty() {
            return Err(anyhow!("nothing to download"));
        }
        Ok(to_srt_string(&entries))
    }

    /// Write one export flavor to the sink under its default file name
    pub fn export(&self, flavor: ExportFlavor, sink: &dyn FileSink) -> Result<PathBuf> {
        let text = self.render(flavor)?;
        sink.write(flavor.file_name(), &text)
    }

    // @method: Load, translate and export one subtitle file
    pub async fn run(&mut self, input_file: &Path, output_dir: &Path, request: &RunRequest) -> Result<Vec<PathBuf>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(input_file, output_dir, request, &multi_progress).await
    }

    async fn run_with_progress(
        &mut self,
        input_file: &Path,
        output_dir: &Path,
        request: &RunRequest,
        multi_progress: &MultiProgress,
    ) -> Result<Vec<PathBuf>> {
        let sink = DirectorySink::new(output_dir).with_force_overwrite(request.force_overwrite);
        if !request.force_overwrite && output_dir.join(ExportFlavor::Translated.file_name()).exists() {
            warn!("Skipping {}, translation already exists (use --force-overwrite to replace it)", input_file.display());
            return Ok(Vec::new());
        }

        let bytes = FileManager::read_bytes(input_file)?;
        self.load_bytes(&FileManager::display_name(input_file), &bytes)?;

        match request.page {
            Some(page) => {
                if !self.view.go_to_page(page) {
                    return Err(anyhow!(
                        "Page {} is out of range, the file has {} pages",
                        page + 1,
                        self.view.page_count()
                    ));
                }
                self.translate_current_page().await?;
            }
            None => {
                self.translate_file_with(multi_progress).await?;
            }
        }

        let mut written = vec![self.export(ExportFlavor::Translated, &sink)?];
        if request.bilingual {
            written.push(self.export(ExportFlavor::Bilingual, &sink)?);
        }
        for path in &written {
            info!("Success: {}", path.display());
        }
        Ok(written)
    }

    /// Run every subtitle file under `input_dir`, one output subdirectory per file.
    ///
    /// A failing file is logged and skipped; the rest still run.
    pub async fn run_folder(&mut self, input_dir: &Path, output_dir: &Path, request: &RunRequest) -> Result<Vec<PathBuf>> {
        let start_time = std::time::Instant::now();
        let files = FileManager::find_subtitle_files(input_dir)?;
        if files.is_empty() {
            warn!("No subtitle files found in {}", input_dir.display());
            return Ok(Vec::new());
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(files.len() as u64))
        } else {
            ProgressBar::hidden()
        };

        let mut written = Vec::new();
        let mut failures = 0;
        for file in &files {
            let stem = file.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            match self.run_with_progress(file, &output_dir.join(stem), request, &multi_progress).await {
                Ok(paths) => written.extend(paths),
                Err(e) => {
                    failures += 1;
                    error!("{}: {:#}", file.display(), e);
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        info!(
            "Processed {} files ({} failed) in {}",
            files.len(),
            failures,
            Self::format_duration(start_time.elapsed())
        );
        Ok(written)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
