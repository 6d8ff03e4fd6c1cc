use std::path::Path;

use film_tagger_domain::{
    ApplyOutcome, ApplyProgress, PresetCollection, RollImage, RollLoadReport, SelectionView,
    ThumbnailResult, WriteTask,
};

pub fn present_load_report(folder: &Path, report: &RollLoadReport) -> String {
    format!(
        "loaded {} image(s) from {} ({} file(s) scanned, {} supported)",
        report.loaded_images,
        folder.display(),
        report.scanned_files,
        report.supported_files
    )
}

pub fn present_roll_image(image: &RollImage) -> String {
    let record = &image.record;
    format!(
        "{}\tcamera={}\tfilm={}\tlens={}\taperture={}\tshutter={}",
        file_label(&image.path),
        or_dash(record.camera.as_deref()),
        or_dash(record.film_stock.as_deref()),
        or_dash(record.lens.as_deref()),
        or_dash(record.aperture.as_deref()),
        or_dash(record.shutter_speed.as_deref())
    )
}

pub fn present_selection(view: &SelectionView) -> String {
    match view {
        SelectionView::Empty => "selection: none".to_string(),
        SelectionView::Single { path, fields } => format!(
            "selection: {} lens={} aperture={} shutter={}",
            file_label(path),
            or_dash(fields.lens.as_deref()),
            or_dash(fields.aperture.as_deref()),
            or_dash(fields.shutter_speed.as_deref())
        ),
        SelectionView::Mixed { count } => format!("selection: {count} images (mixed)"),
    }
}

pub fn present_presets(collection: &PresetCollection) -> Vec<String> {
    if collection.is_empty() {
        return vec![format!("{}: (none)", collection.category().title())];
    }
    let mut lines = vec![format!("{}:", collection.category().title())];
    for (name, fields) in collection.iter() {
        let tags = fields
            .tags()
            .into_iter()
            .map(|(tag, value)| format!("{tag}={value}"))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("  {name}\t{tags}"));
    }
    lines
}

pub fn present_task(task: &WriteTask) -> String {
    if task.tags.is_empty() {
        return format!("{}\t(no tags)", file_label(&task.path));
    }
    let tags = task
        .tags
        .iter()
        .map(|(tag, value)| format!("-{tag}={value}"))
        .collect::<Vec<_>>()
        .join(" ");
    format!("{}\t{tags}", file_label(&task.path))
}

pub fn present_thumbnail(result: &ThumbnailResult) -> String {
    match &result.thumbnail {
        Some(thumbnail) => format!(
            "thumbnail {} {}x{}",
            file_label(&result.path),
            thumbnail.width,
            thumbnail.height
        ),
        None => format!("thumbnail {} unavailable", file_label(&result.path)),
    }
}

pub fn present_progress(progress: &ApplyProgress) -> String {
    format!("[{:>3}%] {}", progress.percent, progress.message)
}

pub fn present_outcome(outcome: &ApplyOutcome) -> String {
    if outcome.success {
        format!("done: {}", outcome.message)
    } else {
        format!("failed: {}", outcome.message)
    }
}

fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
