//! Main application state and UI

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pavi_viewer::analysis::{
    export_alignment, parse_alignment, search, AlignmentAnalytics, ExportFormat,
    FeatureSpan, FeatureStyle, SearchCursor, SearchType, SeqInfoDict,
};
use pavi_viewer::config::{DisplayMode, ViewerConfig, ViewerVariant};
use pavi_viewer::error::Result;
use pavi_viewer::render::{
    build_frame, line_graph, msa_tiles, navigation_ruler, variant_track, ColorScheme, TileStyle,
};
use pavi_viewer::source::{CachedSource, DirectorySource, JobData, JobSource};
use pavi_viewer::viewport::{
    consume_commands, KeyContext, ResizeDebouncer, ViewerCommand, ViewportController,
};

/// Job to fetch on start
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub job_id: String,
    pub data_dir: PathBuf,
}

/// Data named on the command line
#[derive(Debug, Default)]
pub struct Startup {
    pub alignment_text: Option<String>,
    pub alignment_path: Option<PathBuf>,
    pub seq_info: SeqInfoDict,
    pub variants_path: Option<PathBuf>,
    pub job: Option<JobRequest>,
    pub config_path: Option<PathBuf>,
}

/// Application state
pub struct ViewerApp {
    config: ViewerConfig,
    config_path: Option<PathBuf>,

    // Loaded data
    alignment_text: String,
    alignment_path: Option<PathBuf>,
    variants_path: Option<PathBuf>,
    seq_info: Arc<SeqInfoDict>,
    analytics: Option<AlignmentAnalytics>,
    alignment_error: Option<String>,
    variants_error: Option<String>,

    // Job loading
    job: Option<JobRequest>,
    source: Option<Arc<CachedSource<DirectorySource>>>,
    is_loading: bool,
    load_rx: Option<Receiver<Result<JobData>>>,

    // Viewport
    controller: ViewportController,
    debouncer: ResizeDebouncer,
    scroll_dirty: bool,
    hovered_cell: Option<(usize, usize)>,

    // Display options
    display_mode: DisplayMode,
    color_scheme: ColorScheme,
    show_conservation: bool,
    show_alleles: bool,
    show_summary: bool,

    // Search
    search_query: String,
    search_type: SearchType,
    search: SearchCursor,
    search_error: Option<String>,

    // Position detail window
    selected_position: Option<usize>,
    show_position_window: bool,

    // Export / launch
    export_error: Option<String>,
    launch_error: Option<String>,
}

impl ViewerApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ViewerConfig, startup: Startup) -> Self {
        let mut controller = ViewportController::new(config.viewport.clone());
        controller.set_virtualized(config.display_mode == DisplayMode::Virtualized);

        let mut app = Self {
            debouncer: ResizeDebouncer::new(Duration::from_millis(config.resize_debounce_ms)),
            display_mode: config.display_mode,
            color_scheme: config.render.color_scheme,
            config_path: startup.config_path,
            alignment_text: String::new(),
            alignment_path: startup.alignment_path,
            variants_path: startup.variants_path,
            seq_info: Arc::new(startup.seq_info),
            analytics: None,
            alignment_error: None,
            variants_error: None,
            job: None,
            source: None,
            is_loading: false,
            load_rx: None,
            controller,
            scroll_dirty: false,
            hovered_cell: None,
            show_conservation: true,
            show_alleles: true,
            show_summary: false,
            search_query: String::new(),
            search_type: SearchType::Sequence,
            search: SearchCursor::default(),
            search_error: None,
            selected_position: None,
            show_position_window: false,
            export_error: None,
            launch_error: None,
            config,
        };

        if let Some(text) = startup.alignment_text {
            app.set_alignment(text);
        }
        if let Some(job) = startup.job {
            app.start_job_load(job);
        }
        app
    }

    /// Parse new alignment text. Parse failures leave the viewer empty.
    fn set_alignment(&mut self, text: String) {
        self.search = SearchCursor::default();
        self.selected_position = None;
        self.show_position_window = false;

        match parse_alignment(&text) {
            Ok(set) => {
                let set = Arc::new(set);
                let analytics = AlignmentAnalytics::new(
                    set.clone(),
                    self.seq_info.clone(),
                    self.config.render.label_char_width,
                );
                log::info!(
                    "Loaded alignment: {} sequences, {} columns",
                    set.len(),
                    analytics.sequence_length()
                );
                let height = self.controller.state().container_height;
                self.controller
                    .initialize(set.len(), analytics.sequence_length(), height);
                self.scroll_dirty = true;
                self.analytics = Some(analytics);
                self.alignment_error = None;
            }
            Err(e) => {
                log::warn!("Alignment not rendered: {}", e);
                self.analytics = None;
                self.controller.initialize(0, 0, 0.0);
                self.alignment_error = Some(if e.is_no_data() {
                    format!("No alignment data to display ({})", e)
                } else {
                    e.to_string()
                });
            }
        }
        self.alignment_text = text;
    }

    fn set_variants(&mut self, seq_info: SeqInfoDict) {
        let seq_info = Arc::new(seq_info);
        self.seq_info = seq_info.clone();
        self.analytics = self
            .analytics
            .take()
            .map(|analytics| analytics.with_variants(seq_info));
        self.variants_error = None;
    }

    fn start_job_load(&mut self, job: JobRequest) {
        let source = match &self.source {
            Some(source) if source.inner().dir() == job.data_dir.as_path() => source.clone(),
            _ => Arc::new(CachedSource::new(
                DirectorySource::new(&job.data_dir),
                &self.config.cache,
            )),
        };
        self.source = Some(source.clone());

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.alignment_error = None;

        let job_id = job.job_id.clone();
        self.job = Some(job);
        log::info!("Loading job {}", job_id);

        thread::spawn(move || {
            let _ = tx.send(source.load(&job_id));
        });
    }

    fn check_loading(&mut self) {
        let Some(rx) = &self.load_rx else {
            return;
        };
        let Ok(result) = rx.try_recv() else {
            return;
        };
        self.load_rx = None;
        self.is_loading = false;
        match result {
            Ok(data) => {
                self.set_variants(data.seq_info);
                self.set_alignment(data.alignment_text);
            }
            Err(e) => {
                log::error!("Failed to load job: {}", e);
                self.alignment_error = Some(e.to_string());
            }
        }
    }

    fn load_alignment_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Alignment", &["aln", "clustal", "clw", "fasta", "fa", "fas", "txt"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    self.job = None;
                    self.alignment_path = Some(path);
                    self.set_alignment(content);
                }
                Err(e) => {
                    self.alignment_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn load_variants_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            match std::fs::read_to_string(&path) {
                Ok(json) => match serde_json::from_str::<SeqInfoDict>(&json) {
                    Ok(seq_info) => {
                        self.variants_path = Some(path);
                        self.set_variants(seq_info);
                    }
                    Err(e) => {
                        self.variants_error = Some(format!("Failed to parse: {}", e));
                    }
                },
                Err(e) => {
                    self.variants_error = Some(format!("Failed to read file: {}", e));
                }
            }
        }
    }

    fn export(&mut self, format: ExportFormat) {
        let Some(analytics) = &self.analytics else {
            self.export_error = Some("No alignment to export".to_string());
            return;
        };
        let job_id = self.job.as_ref().map(|j| j.job_id.as_str());
        let file_name = format!("{}.{}", job_id.unwrap_or("alignment"), format.extension());

        if let Some(path) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(file_name)
            .save_file()
        {
            match export_alignment(analytics.set(), format, job_id) {
                Ok(text) => {
                    if let Err(e) = std::fs::write(&path, text) {
                        self.export_error = Some(format!("Failed to write file: {}", e));
                    } else {
                        log::info!("Exported {} to {}", format.label(), path.display());
                        self.export_error = None;
                    }
                }
                Err(e) => {
                    self.export_error = Some(format!("Failed to export: {}", e));
                }
            }
        }
    }

    /// Start a second viewer process showing the same data full screen
    fn open_full_screen(&mut self) {
        let exe = match std::env::current_exe() {
            Ok(exe) => exe,
            Err(e) => {
                self.launch_error = Some(format!("Cannot locate viewer executable: {}", e));
                return;
            }
        };
        let mut command = std::process::Command::new(exe);
        if let Some(job) = &self.job {
            command
                .arg("--job")
                .arg(&job.job_id)
                .arg("--data-dir")
                .arg(&job.data_dir);
        } else if let Some(path) = &self.alignment_path {
            command.arg(path);
            if let Some(variants) = &self.variants_path {
                command.arg("--variants").arg(variants);
            }
        } else {
            self.launch_error = Some("Full screen needs a job or an alignment file".to_string());
            return;
        }
        if let Some(config) = &self.config_path {
            command.arg("--config").arg(config);
        }
        command.arg("--full-screen");

        match command.spawn() {
            Ok(child) => {
                log::info!("Opened full-screen viewer (pid {})", child.id());
                self.launch_error = None;
            }
            Err(e) => {
                self.launch_error = Some(format!("Failed to open full screen: {}", e));
            }
        }
    }

    fn run_search(&mut self) {
        let Some(analytics) = &self.analytics else {
            return;
        };
        match search(
            analytics.set(),
            analytics.variants(),
            &self.search_query,
            self.search_type,
        ) {
            Ok(matches) => {
                self.search = SearchCursor::new(matches);
                self.search_error = None;
                self.reveal_current_match();
            }
            Err(e) => {
                self.search = SearchCursor::default();
                self.search_error = Some(e.to_string());
            }
        }
    }

    fn reveal_current_match(&mut self) {
        if let Some(m) = self.search.current() {
            self.controller.reveal(m.row_index, m.start);
            self.scroll_dirty = true;
        }
    }

    fn handle_command(&mut self, ctx: &egui::Context, command: ViewerCommand) {
        if command == ViewerCommand::CloseFullScreen {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        let before = self.controller.state().scroll_top;
        self.controller.apply(command);
        if self.controller.state().scroll_top != before {
            self.scroll_dirty = true;
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let key_ctx = KeyContext {
            virtualized: self.controller.is_virtualized() && self.display_mode != DisplayMode::Text,
            variant: self.config.variant,
            scroll_step_rows: self.config.viewport.scroll_step_rows,
        };
        let commands = ctx.input_mut(|i| consume_commands(i, &key_ctx));
        for command in commands {
            self.handle_command(ctx, command);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.is_loading {
            self.check_loading();
            ctx.request_repaint_after(Duration::from_millis(50));
        }

        self.handle_keys(ctx);

        // Top menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Alignment...").clicked() {
                        self.load_alignment_file();
                        ui.close_menu();
                    }
                    if ui.button("Open Variants...").clicked() {
                        self.load_variants_file();
                        ui.close_menu();
                    }
                    ui.separator();
                    ui.menu_button("Export", |ui| {
                        for format in ExportFormat::ALL {
                            if ui.button(format.label()).clicked() {
                                self.export(format);
                                ui.close_menu();
                            }
                        }
                    });
                });
                ui.menu_button("View", |ui| {
                    ui.checkbox(&mut self.show_alleles, "Allele Information");
                    ui.checkbox(&mut self.show_summary, "Alignment Summary");
                });
                if self.config.variant == ViewerVariant::Inline
                    && ui.button("⛶ Full Screen").clicked()
                {
                    self.open_full_screen();
                }
            });
        });

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            self.show_controls(ui);
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.show_status(ui);
        });

        if self.show_alleles {
            let has_alleles = self
                .analytics
                .as_ref()
                .is_some_and(|a| !a.alleles().is_empty());
            if has_alleles {
                egui::SidePanel::right("alleles")
                    .resizable(true)
                    .default_width(340.0)
                    .show(ctx, |ui| self.show_allele_panel(ui));
            }
        }

        egui::CentralPanel::default().show(ctx, |ui| match self.display_mode {
            DisplayMode::Text => self.show_text_view(ui),
            DisplayMode::Virtualized | DisplayMode::Interactive => self.show_tile_view(ui),
        });

        if self.show_position_window {
            self.show_position_details(ctx);
        }
        if self.show_summary {
            self.show_summary_window(ctx);
        }
    }
}

impl ViewerApp {
    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal_wrapped(|ui| {
            egui::ComboBox::from_label("Color scheme")
                .selected_text(self.color_scheme.label())
                .show_ui(ui, |ui| {
                    for scheme in ColorScheme::ALL {
                        ui.selectable_value(&mut self.color_scheme, scheme, scheme.label());
                    }
                });
            ui.checkbox(&mut self.show_conservation, "Show conservation");

            let previous = self.display_mode;
            egui::ComboBox::from_label("Display")
                .selected_text(self.display_mode.label())
                .show_ui(ui, |ui| {
                    for mode in DisplayMode::ALL {
                        ui.selectable_value(&mut self.display_mode, mode, mode.label());
                    }
                });
            if self.display_mode != previous {
                log::debug!("Display mode changed to {:?}", self.display_mode);
                self.controller
                    .set_virtualized(self.display_mode == DisplayMode::Virtualized);
            }

            if self.analytics.is_some() && self.display_mode == DisplayMode::Virtualized {
                ui.separator();
                ui.label(format!(
                    "Showing {} of {} sequences",
                    self.controller.visible_rows().len(),
                    self.controller.row_count()
                ));
            }
            if self.display_mode != DisplayMode::Text {
                ui.separator();
                let hint = if self.display_mode == DisplayMode::Virtualized {
                    "←/→ pan, ↑/↓ scroll, +/- zoom, Home/End jump"
                } else {
                    "←/→ pan, +/- zoom, Home/End jump"
                };
                ui.label(egui::RichText::new(hint).weak());
            }
        });

        ui.horizontal(|ui| {
            egui::ComboBox::from_id_salt("search_type")
                .selected_text(self.search_type.label())
                .show_ui(ui, |ui| {
                    for kind in SearchType::ALL {
                        ui.selectable_value(&mut self.search_type, kind, kind.label());
                    }
                });
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_query)
                    .hint_text("Search alignment...")
                    .desired_width(220.0),
            );
            let submitted =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if submitted || ui.button("Search").clicked() {
                self.run_search();
            }

            if !self.search.is_empty() {
                if ui.button("◀").clicked() {
                    self.search.prev();
                    self.reveal_current_match();
                }
                let mut picked = None;
                egui::ComboBox::from_id_salt("search_matches")
                    .selected_text(format!("{} of {}", self.search.index() + 1, self.search.len()))
                    .show_ui(ui, |ui| {
                        for (i, m) in self.search.matches().iter().enumerate() {
                            let text = format!("{} {}-{}", m.sequence_name, m.start, m.end);
                            if ui.selectable_label(i == self.search.index(), text).clicked() {
                                picked = Some(i);
                            }
                        }
                    });
                if let Some(i) = picked {
                    self.search.select(i);
                    self.reveal_current_match();
                }
                if ui.button("▶").clicked() {
                    self.search.next();
                    self.reveal_current_match();
                }
                if let Some(m) = self.search.current() {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} {}-{}: {}",
                            m.sequence_name, m.start, m.end, m.context
                        ))
                        .monospace(),
                    );
                }
            } else if !self.search_query.trim().is_empty() && self.search_error.is_none() {
                ui.label(egui::RichText::new("No matches").weak());
            }
            if let Some(error) = &self.search_error {
                ui.colored_label(egui::Color32::RED, error);
            }
        });
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if self.is_loading {
                ui.spinner();
                let job = self.job.as_ref().map(|j| j.job_id.as_str()).unwrap_or("");
                ui.label(format!("Loading job {}...", job));
            } else if let Some(analytics) = &self.analytics {
                let (start, end) = self.controller.display_range();
                ui.label(format!(
                    "{} sequences × {} columns | columns {}-{}",
                    analytics.set().len(),
                    analytics.sequence_length(),
                    start,
                    end
                ));
                if let Some((row, column)) = self.hovered_cell {
                    if let Some(r) = analytics.set().rows().get(row) {
                        let residue = r.residue_at(column - 1).map(|b| b as char).unwrap_or(' ');
                        ui.separator();
                        ui.label(format!("{} @ {}: {}", r.name, column, residue));
                    }
                }
            } else {
                ui.label("Open an alignment to begin");
            }

            for error in [
                &self.alignment_error,
                &self.variants_error,
                &self.export_error,
                &self.launch_error,
            ]
            .into_iter()
            .flatten()
            {
                ui.separator();
                ui.colored_label(egui::Color32::RED, error);
            }
        });
    }

    fn show_text_view(&mut self, ui: &mut egui::Ui) {
        if self.alignment_text.is_empty() {
            ui.label("No alignment loaded.");
            return;
        }
        egui::ScrollArea::both()
            .id_salt("text_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(egui::RichText::new(&self.alignment_text).monospace());
            });
    }

    fn show_tile_view(&mut self, ui: &mut egui::Ui) {
        let Some(analytics) = self.analytics.as_ref() else {
            match &self.alignment_error {
                Some(error) => ui.colored_label(egui::Color32::YELLOW, error),
                None => ui.label("No alignment loaded."),
            };
            return;
        };
        let render = &self.config.render;
        let label_width = analytics.label_width().max(40.0) + 12.0;

        if let Some((start, end)) = navigation_ruler(
            ui,
            analytics.sequence_length(),
            self.controller.display_range(),
            label_width,
            render.ruler_height,
        ) {
            self.controller.set_display_range(start, end);
        }
        let display = self.controller.display_range();

        if self.show_conservation && !analytics.conservation().is_empty() {
            line_graph(
                ui,
                analytics.conservation(),
                display,
                label_width,
                render.conservation_height,
            );
        }

        let header = build_frame(analytics, &self.controller, render);
        if let Some(track) = header.track {
            variant_track(
                ui,
                track,
                display,
                label_width,
                render.lane_height,
                header.track_height,
            );
        }
        ui.separator();

        let style = TileStyle {
            scheme: self.color_scheme,
            row_height: self.controller.config().row_height,
            tile_height: render.tile_height,
            max_tile_width: render.tile_width,
        };
        let current_match = self.search.current().cloned();

        let mut area = egui::ScrollArea::vertical()
            .id_salt("msa_scroll")
            .auto_shrink([false, false]);
        if self.scroll_dirty {
            area = area.vertical_scroll_offset(self.controller.state().scroll_top);
            self.scroll_dirty = false;
        }

        let controller = &mut self.controller;
        let output = area.show_viewport(ui, |ui, viewport| {
            controller.scroll(viewport.min.y);
            let mut frame = build_frame(analytics, controller, render);
            frame.label_width = label_width;
            if let Some(m) = &current_match {
                if let Some(local) = frame.slice.window.to_local(m.row_index) {
                    frame.features.push(FeatureSpan {
                        row_start: local,
                        row_end: local,
                        column_start: m.start,
                        column_end: m.end,
                        id: "search_match".to_string(),
                        style: FeatureStyle {
                            border_color: [255, 200, 0],
                            fill_color: [255, 200, 0],
                            hover_fill_color: None,
                        },
                    });
                }
            }
            msa_tiles(ui, &frame, &style)
        });

        // Container height feeds virtualization; settle it before applying
        let height = output.inner_rect.height();
        let now = Instant::now();
        if self.controller.state().container_height <= 0.0 {
            self.controller.resize(height);
        }
        self.debouncer.observe(height, now);
        if let Some(settled) = self.debouncer.poll(now) {
            self.controller.resize(settled);
        }
        if let Some(wait) = self.debouncer.remaining(now) {
            ui.ctx().request_repaint_after(wait);
        }

        let tiles = output.inner;
        self.hovered_cell = tiles.hovered;
        if let Some((_, column)) = tiles.clicked {
            self.selected_position = Some(column);
            self.show_position_window = true;
        }
    }

    fn show_allele_panel(&self, ui: &mut egui::Ui) {
        let Some(analytics) = &self.analytics else {
            return;
        };
        ui.heading("Allele Information");
        ui.separator();
        egui::ScrollArea::vertical()
            .id_salt("allele_scroll")
            .show(ui, |ui| {
                egui::Grid::new("allele_grid")
                    .striped(true)
                    .num_columns(5)
                    .show(ui, |ui| {
                        ui.strong("Sequence");
                        ui.strong("Variant");
                        ui.strong("Ref → Alt");
                        ui.strong("Position");
                        ui.strong("Type");
                        ui.end_row();
                        for allele in analytics.alleles() {
                            ui.label(&allele.seq_name);
                            ui.label(&allele.variant_id);
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} → {}",
                                    allele.ref_seq, allele.alt_seq
                                ))
                                .monospace(),
                            );
                            ui.label(&allele.position);
                            ui.label(&allele.kind);
                            ui.end_row();
                        }
                    });
            });
    }

    fn show_position_details(&mut self, ctx: &egui::Context) {
        let Some(position) = self.selected_position else {
            self.show_position_window = false;
            return;
        };
        let Some(info) = self
            .analytics
            .as_ref()
            .and_then(|a| a.position_info(position))
        else {
            self.show_position_window = false;
            return;
        };

        let mut open = self.show_position_window;
        egui::Window::new(format!("Position {}", position))
            .open(&mut open)
            .resizable(true)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::Grid::new("position_summary").show(ui, |ui| {
                    ui.label("Conservation:");
                    ui.label(format!(
                        "{:.1}% ({})",
                        info.conservation * 100.0,
                        info.level.label()
                    ));
                    ui.end_row();
                    ui.label("Consensus:");
                    ui.monospace(
                        info.consensus_residue
                            .map(|c| c.to_string())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    ui.end_row();
                    if let Some(code) = info.ambiguity_code {
                        ui.label("IUPAC code:");
                        ui.monospace(code.to_string());
                        ui.end_row();
                    }
                    ui.label("Gaps:");
                    ui.label(format!("{} of {}", info.gap_count, info.total_sequences));
                    ui.end_row();
                });

                ui.separator();
                ui.strong("Residue distribution");
                egui::Grid::new("position_residues")
                    .striped(true)
                    .show(ui, |ui| {
                        for residue in &info.residues {
                            ui.monospace(residue.residue.to_string());
                            ui.label(residue.name);
                            ui.label(residue.property);
                            ui.label(format!("{} ({:.1}%)", residue.count, residue.percentage));
                            ui.end_row();
                        }
                    });

                if !info.variants.is_empty() {
                    ui.separator();
                    ui.strong("Variants at this position");
                    for (name, variant) in &info.variants {
                        ui.label(format!(
                            "{}: {} ({})",
                            name, variant.variant_id, variant.seq_substitution_type
                        ));
                    }
                }
            });
        self.show_position_window = open;
    }

    fn show_summary_window(&mut self, ctx: &egui::Context) {
        let Some(analytics) = &self.analytics else {
            return;
        };
        let stats = analytics.stats().clone();
        let cache = self.source.as_ref().map(|s| s.stats());

        let mut open = self.show_summary;
        egui::Window::new("Alignment Summary")
            .open(&mut open)
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("summary_grid").show(ui, |ui| {
                    ui.label("Sequences:");
                    ui.label(stats.sequence_count.to_string());
                    ui.end_row();
                    ui.label("Alignment length:");
                    ui.label(stats.alignment_length.to_string());
                    ui.end_row();
                    ui.label("Conserved columns:");
                    ui.label(format!("{:.1}%", stats.conservation_score));
                    ui.end_row();
                    ui.label("Gaps:");
                    ui.label(format!("{:.1}%", stats.gap_percentage));
                    ui.end_row();
                    ui.label("Variants:");
                    ui.label(stats.variants_count.to_string());
                    ui.end_row();
                    ui.label("Failed sequences:");
                    ui.label(stats.failures_count.to_string());
                    ui.end_row();
                    if let Some(cache) = cache {
                        ui.label("Cache:");
                        ui.label(format!(
                            "{} hits, {} misses, {} entries",
                            cache.hits, cache.misses, cache.entries
                        ));
                        ui.end_row();
                    }
                });
            });
        self.show_summary = open;
    }
}
