//! Document-level extraction loop.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::container::write_container;
use super::dispatch::dispatch;
use super::options::{ExtractOptions, ExtractionReport};
use crate::backend::{
    walk_resources, DocumentModel, ImageRef, ImageRegistry, LopdfModel, ObjectKey, Scope, Walk,
};
use crate::error::{Error, Result};
use crate::model::{Dimension, ImageRecord, Resolution};

/// Geometry and document info shared by the images of one page.
struct PageContext<'a> {
    page_index: usize,
    dimension: Dimension,
    user_unit: f32,
    producer: Option<&'a str>,
    date: Option<DateTime<Utc>>,
}

/// Extract every image of a document, each distinct image once.
///
/// Per-image failures are counted in the report and do not stop the
/// document; a failure to walk a page does.
pub fn extract_document<M: DocumentModel + ?Sized>(
    model: &M,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let info = model.info();
    let producer = info
        .producer
        .clone()
        .or_else(|| options.default_producer.clone());
    let date = info.effective_date();

    let mut registry = ImageRegistry::new();
    let mut report = ExtractionReport::default();

    for (page_index, page) in model.pages()?.into_iter().enumerate() {
        let context = PageContext {
            page_index,
            dimension: model.page_dimension(page)?,
            user_unit: model.page_user_unit(page),
            producer: producer.as_deref(),
            date,
        };

        let mut images = Vec::new();
        walk_resources(model, Scope::Page(page), |image| {
            // only streams can be extracted
            if let Some(key) = image.key.object() {
                if registry.register(image.key).is_some() {
                    images.push((key, image.clone()));
                }
            }
            Walk::Continue
        })?;

        for (key, image) in images {
            let index = options.first_index + report.extracted;
            let output_path = |suffix: &str| options.output_path(index, suffix);
            match extract_image(model, key, &image, &context, output_path) {
                Ok(path) => {
                    log::info!("{}: wrote {}", model.name(), path.display());
                    report.extracted += 1;
                    report.outputs.push(path);
                }
                Err(e) if e.is_unsupported_image() => {
                    log::warn!(
                        "{}: page {} image {}: {}",
                        model.name(),
                        page_index + 1,
                        image.name,
                        e
                    );
                    report.skipped += 1;
                }
                Err(e) => {
                    log::error!(
                        "{}: page {} image {}: {}",
                        model.name(),
                        page_index + 1,
                        image.name,
                        e
                    );
                    report.failed += 1;
                }
            }
        }
    }

    debug_assert_eq!(report.total(), registry.count());
    log::info!(
        "{}: {} of {} images extracted, {} skipped, {} failed",
        model.name(),
        report.extracted,
        report.total(),
        report.skipped,
        report.failed
    );
    Ok(report)
}

/// Load a file and extract its images.
///
/// A load failure is reported as [`Error::DocumentUnreadable`].
pub fn extract_file<P: AsRef<Path>>(path: P, options: &ExtractOptions) -> Result<ExtractionReport> {
    let path = path.as_ref();
    let unreadable = |e: Error| Error::DocumentUnreadable {
        name: path.display().to_string(),
        reason: e.to_string(),
    };
    let model = LopdfModel::load_file(path).map_err(unreadable)?;
    extract_document(&model, options).map_err(unreadable)
}

fn extract_image<M, F>(
    model: &M,
    key: ObjectKey,
    image: &ImageRef,
    page: &PageContext<'_>,
    output_path: F,
) -> Result<PathBuf>
where
    M: DocumentModel + ?Sized,
    F: Fn(&str) -> PathBuf,
{
    let metadata = model.image_metadata(key)?;
    let kind = dispatch(&metadata.filters, metadata.components).map_err(|e| match e {
        Error::MissingColorspace { .. } => Error::MissingColorspace {
            image: image.name.clone(),
        },
        other => other,
    })?;
    log::debug!(
        "{}: page {} image {} [{}] as {:?}",
        model.name(),
        page.page_index + 1,
        image.name,
        metadata.filters.join(","),
        kind
    );

    let resolution =
        Resolution::from_geometry(&metadata.dimension(), &page.dimension, page.user_unit);
    let stream = model.open_stream(key, kind.kept_filters())?;
    let mut record =
        ImageRecord::new(metadata, stream.reader, stream.length).with_resolution(resolution);
    if kind.is_tiff() {
        if let Some(producer) = page.producer {
            record = record.with_producer(producer);
        }
        if let Some(date) = page.date {
            record = record.with_creation_date(date);
        }
    }

    let path = output_path(kind.suffix());
    let file = File::create(&path).map_err(|source| Error::OutputWrite {
        path: path.clone(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    let written = write_container(kind, record, &mut writer)
        .and_then(|n| writer.flush().map(|_| n).map_err(Error::from));
    drop(writer);

    match written {
        Ok(bytes) => {
            log::debug!("{}: {} bytes", path.display(), bytes);
            Ok(path)
        }
        Err(e) => {
            // no partial output
            if let Err(remove) = fs::remove_file(&path) {
                log::warn!("could not remove {}: {}", path.display(), remove);
            }
            Err(match e {
                Error::Io(source) => Error::OutputWrite { path, source },
                other => other,
            })
        }
    }
}
