use eframe::egui;
use gpuviz_core::builder::{ServerBuilder, ServerConfiguration};
use gpuviz_core::camera::{CameraAnimator, CameraRig, OrbitControls, PerspectiveCamera};
use gpuviz_core::config::AppConfig;
use gpuviz_core::hardware::{
    CONSUMER_DEVICES, ContributionKind, GpuModel, SUPERCOMPUTER_CONFIGS,
};
use gpuviz_core::placement::PlacementKind;
use gpuviz_core::scene::{self, SceneParams};
use gpuviz_core::thermal::{self, ThermalSimulation};
use gpuviz_protocol::ThemeToken;

use crate::renderer;
use crate::theme::{self, ThemeMode};

/// Radians of orbit per dragged pixel.
const ORBIT_SPEED: f64 = 0.008;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Home,
    Visualize,
    Build,
}

impl Page {
    const ALL: [Page; 3] = [Page::Home, Page::Visualize, Page::Build];

    fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Visualize => "Visualize",
            Page::Build => "Build",
        }
    }
}

/// Main application state.
pub struct GpuVizApp {
    page: Page,
    theme_mode: ThemeMode,
    camera: PerspectiveCamera,
    animator: CameraAnimator,
    orbit: OrbitControls,
    thermal: ThermalSimulation,
    params: SceneParams,
    /// Host clock of the previous visualize frame.
    last_frame: Option<f64>,
    initial_view: String,
    builder: ServerBuilder,
    /// Component the floor-plan cursor places.
    palette: PlacementKind,
    /// Message for the status bar (export results, errors).
    status: Option<String>,
}

impl GpuVizApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        let theme_mode = ThemeMode::Dark;
        cc.egui_ctx.set_visuals(theme::visuals(theme_mode));
        theme::apply_typography(&cc.egui_ctx);

        let mut camera = PerspectiveCamera::default();
        let mut animator =
            CameraAnimator::new(config.view_registry(), config.transition_duration_secs);
        animator.mount(&mut camera, &config.initial_view);

        Self {
            page: Page::Home,
            theme_mode,
            camera,
            animator,
            orbit: OrbitControls::default(),
            thermal: ThermalSimulation::new(),
            params: SceneParams::from_config(config),
            last_frame: None,
            initial_view: config.initial_view.clone(),
            builder: ServerBuilder::from_config(config),
            palette: PlacementKind::GpuServer,
            status: None,
        }
    }

    fn current_view(&self) -> String {
        self.animator
            .current_view()
            .unwrap_or(&self.initial_view)
            .to_string()
    }

    fn color(&self, token: ThemeToken) -> egui::Color32 {
        theme::resolve(token, self.theme_mode)
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme_mode = match self.theme_mode {
            ThemeMode::Dark => ThemeMode::Light,
            ThemeMode::Light => ThemeMode::Dark,
        };
        ctx.set_visuals(theme::visuals(self.theme_mode));
    }

    // ── Home ───────────────────────────────────────────────────────────────

    fn home_page(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() / 6.0);
            ui.label(
                egui::RichText::new("GPU Visualizer")
                    .size(theme::FONT_DISPLAY)
                    .strong()
                    .color(self.color(ThemeToken::Accent)),
            );
            ui.label(
                egui::RichText::new(
                    "From a single accelerator to a warehouse of racks: see what the hardware looks like and what it can do.",
                )
                .color(self.color(ThemeToken::TextSecondary)),
            );
            ui.add_space(24.0);
            ui.horizontal(|ui| {
                let width = ui.available_width();
                ui.add_space((width - 420.0).max(0.0) / 2.0);
                if ui.button("Explore GPUs in 3D").clicked() {
                    self.page = Page::Visualize;
                }
                if ui.button("Build your own server").clicked() {
                    self.page = Page::Build;
                }
            });
            ui.add_space(32.0);

            egui::Grid::new("home_models")
                .num_columns(4)
                .spacing([24.0, 8.0])
                .show(ui, |ui| {
                    for heading in ["Model", "Compute", "Memory", "TDP"] {
                        ui.label(
                            egui::RichText::new(heading).color(self.color(ThemeToken::TextMuted)),
                        );
                    }
                    ui.end_row();
                    for model in GpuModel::ALL {
                        let spec = model.spec();
                        ui.label(egui::RichText::new(spec.name).strong());
                        ui.label(spec.compute.tflops);
                        ui.label(format!("{} {}", spec.memory.capacity, spec.memory.kind));
                        ui.label(format!("{:.0} W", spec.power.tdp_watts));
                        ui.end_row();
                    }
                });
        });
    }

    // ── Visualize ──────────────────────────────────────────────────────────

    fn advance_clock(&mut self, now: f64) {
        let delta = thermal::frame_delta(self.last_frame, now);
        self.last_frame = Some(now);
        self.params.time = now;
        self.thermal.step(self.params.load, delta);
        self.animator.update(&mut self.camera, now);
    }

    fn view_tabs(&mut self, ui: &mut egui::Ui, now: f64) {
        let current = self.current_view();
        let mut clicked = None;
        ui.horizontal(|ui| {
            for (key, view) in self.animator.views().iter() {
                if ui
                    .selectable_label(key == current, &view.name)
                    .on_hover_text(&view.description)
                    .clicked()
                {
                    clicked = Some(key.to_string());
                }
            }
        });
        if let Some(key) = clicked {
            self.animator.select_view(&self.camera, &key, now);
        }
        if let Some(view) = self.animator.views().get(&current) {
            ui.label(
                egui::RichText::new(&view.description).color(self.color(ThemeToken::TextMuted)),
            );
        }
    }

    fn scene_controls(&mut self, ui: &mut egui::Ui, view: &str) {
        ui.heading("Controls");
        ui.add(egui::Slider::new(&mut self.params.load, 0.0..=1.0).text("Load"));
        ui.checkbox(&mut self.params.show_thermal, "Thermal view");
        ui.checkbox(&mut self.params.show_performance, "Performance view");
        ui.separator();

        match view {
            "server" => {
                model_combo(ui, "server_model", &mut self.params.gpu_model);
                ui.add(
                    egui::DragValue::new(&mut self.params.gpu_count)
                        .range(1..=scene::MAX_RACK_GPUS)
                        .prefix("GPUs: "),
                );
            }
            "warehouse" => {
                let current = SUPERCOMPUTER_CONFIGS
                    .get(self.params.cluster)
                    .map_or("", |c| c.name);
                egui::ComboBox::from_id_salt("cluster")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for (i, cluster) in SUPERCOMPUTER_CONFIGS.iter().enumerate() {
                            ui.selectable_value(&mut self.params.cluster, i, cluster.name)
                                .on_hover_text(cluster.description);
                        }
                    });
            }
            "idle" => {
                let current = CONSUMER_DEVICES
                    .get(self.params.device)
                    .map_or("", |d| d.name);
                egui::ComboBox::from_id_salt("device")
                    .selected_text(current)
                    .show_ui(ui, |ui| {
                        for (i, device) in CONSUMER_DEVICES.iter().enumerate() {
                            ui.selectable_value(&mut self.params.device, i, device.name);
                        }
                    });
                egui::ComboBox::from_id_salt("contribution")
                    .selected_text(self.params.contribution.label())
                    .show_ui(ui, |ui| {
                        for kind in ContributionKind::ALL {
                            ui.selectable_value(&mut self.params.contribution, kind, kind.label());
                        }
                    });
                ui.add(
                    egui::Slider::new(&mut self.params.idle_hours, 0.0..=24.0).text("Idle h/day"),
                );
                ui.checkbox(&mut self.params.show_contribution, "Show contribution");
            }
            _ => {}
        }

        ui.separator();
        let model = if view == "server" {
            self.params.gpu_model
        } else {
            SUPERCOMPUTER_CONFIGS
                .get(self.params.cluster)
                .filter(|_| view == "warehouse")
                .map_or(self.params.gpu_model, |c| c.gpu_model)
        };
        self.gpu_info(ui, model);
    }

    fn gpu_info(&self, ui: &mut egui::Ui, model: GpuModel) {
        let spec = model.spec();
        let state = self.thermal.state(model);
        egui::CollapsingHeader::new(spec.name)
            .default_open(true)
            .show(ui, |ui| {
                egui::Grid::new("gpu_info").num_columns(2).show(ui, |ui| {
                    let rows = [
                        ("Memory", format!("{} {}", spec.memory.capacity, spec.memory.kind)),
                        ("Bandwidth", spec.memory.bandwidth.to_string()),
                        ("Compute", spec.compute.tflops.to_string()),
                        ("Architecture", spec.compute.architecture.to_string()),
                        ("Tensor cores", spec.compute.tensor_cores.to_string()),
                        ("TDP", format!("{:.0} W", spec.power.tdp_watts)),
                        ("Cooling", spec.power.cooling.to_string()),
                        ("Inference", spec.performance.inference_speed.to_string()),
                        ("Training", spec.performance.training_capability.to_string()),
                        ("Efficiency", spec.performance.efficiency.to_string()),
                    ];
                    for (name, value) in rows {
                        ui.label(egui::RichText::new(name).color(self.color(ThemeToken::TextMuted)));
                        ui.label(value);
                        ui.end_row();
                    }
                    let hot = state.temperature_c > spec.power.max_temp_c * 0.9;
                    let token = if hot {
                        ThemeToken::MetricWarning
                    } else {
                        ThemeToken::MetricOk
                    };
                    ui.label(egui::RichText::new("Temperature").color(self.color(ThemeToken::TextMuted)));
                    ui.colored_label(
                        self.color(token),
                        format!("{:.1} °C / {:.0} °C", state.temperature_c, spec.power.max_temp_c),
                    );
                    ui.end_row();
                });
            });
    }

    fn scene_canvas(&mut self, ui: &mut egui::Ui, view: &str) {
        let available = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(available, egui::Sense::click_and_drag());

        // The animator owns the camera while a transition runs.
        if !self.animator.is_transitioning() {
            if response.dragged() {
                let delta = response.drag_delta();
                self.orbit.rotate(
                    &mut self.camera,
                    -f64::from(delta.x) * ORBIT_SPEED,
                    -f64::from(delta.y) * ORBIT_SPEED,
                );
            }
            if response.hovered() {
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                if scroll.abs() > 0.1 {
                    self.orbit
                        .dolly(&mut self.camera, (-f64::from(scroll) * 0.002).exp());
                }
            }
        }

        let painter = ui.painter_at(available);
        painter.rect_filled(available, egui::CornerRadius::ZERO, self.color(ThemeToken::Background));

        let commands = scene::compose(view, &self.params, &self.thermal);
        let result = renderer::render_scene(&painter, available, &self.camera, &commands);

        if let Some(hover_pos) = response.hover_pos()
            && let Some(hit) = result.hit(hover_pos)
        {
            #[allow(deprecated)]
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new("scene_tooltip"),
                |ui| {
                    ui.label(egui::RichText::new(&hit.label).strong());
                    ui.label(
                        egui::RichText::new(&hit.group_id).color(self.color(ThemeToken::TextMuted)),
                    );
                },
            );
        }

        let p = self.camera.position();
        painter.text(
            available.left_bottom() + egui::vec2(8.0, -8.0),
            egui::Align2::LEFT_BOTTOM,
            format!(
                "camera ({:.1}, {:.1}, {:.1}) · {} primitives",
                p.x, p.y, p.z, result.primitives
            ),
            egui::FontId::proportional(theme::FONT_CAPTION),
            self.color(ThemeToken::TextMuted),
        );
    }

    fn visualize_page(&mut self, ctx: &egui::Context) {
        let now = ctx.input(|i| i.time);
        self.advance_clock(now);

        egui::TopBottomPanel::top("view_tabs").show(ctx, |ui| {
            self.view_tabs(ui, now);
        });

        let view = self.current_view();
        egui::SidePanel::left("scene_controls")
            .default_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    self.scene_controls(ui, &view);
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.scene_canvas(ui, &view);
            });

        // Fans and particles animate continuously.
        ctx.request_repaint();
    }

    // ── Build ──────────────────────────────────────────────────────────────

    fn configuration_list(&mut self, ui: &mut egui::Ui) {
        ui.heading("Configurations");
        let mut clicked = None;
        for (i, config) in self.builder.configurations().iter().enumerate() {
            let selected = self.builder.selected_index() == Some(i);
            if ui
                .selectable_label(selected, format!("{} · {} GPUs", config.name, config.total_gpus()))
                .clicked()
            {
                clicked = Some(i);
            }
        }
        if let Some(i) = clicked {
            self.builder.select(i);
        }
        ui.horizontal(|ui| {
            if ui.button("Add").clicked() {
                let n = self.builder.configurations().len() + 1;
                self.builder.add(ServerConfiguration {
                    name: format!("Server {n}"),
                    ..ServerConfiguration::default()
                });
            }
            let selected = self.builder.selected_index();
            if ui
                .add_enabled(selected.is_some(), egui::Button::new("Remove"))
                .clicked()
                && let Some(i) = selected
            {
                self.builder.remove(i);
            }
        });

        let mut load = self.builder.load();
        if ui
            .add(egui::Slider::new(&mut load, 0.0..=1.0).text("Load"))
            .changed()
        {
            self.builder.set_load(load);
        }
        ui.separator();

        let Some(index) = self.builder.selected_index() else {
            ui.label(
                egui::RichText::new("Add a configuration to see its figures.")
                    .color(self.color(ThemeToken::TextMuted)),
            );
            return;
        };
        let Some(mut edited) = self.builder.selected().cloned() else {
            return;
        };
        let mut changed = ui.text_edit_singleline(&mut edited.name).changed();
        changed |= model_combo(ui, "build_model", &mut edited.gpu_model);
        changed |= ui
            .add(egui::DragValue::new(&mut edited.gpu_count).range(1..=64).prefix("GPUs per rack: "))
            .changed();
        changed |= ui
            .add(egui::DragValue::new(&mut edited.rack_count).range(1..=256).prefix("Racks: "))
            .changed();
        if changed {
            self.builder.update(index, edited.clone());
        }

        ui.separator();
        let summary = self.builder.summary(&edited);
        let status = if summary.rack.near_capacity {
            ThemeToken::MetricWarning
        } else {
            ThemeToken::MetricOk
        };
        egui::Grid::new("build_summary").num_columns(2).show(ui, |ui| {
            ui.label("Total GPUs");
            ui.label(summary.total_gpus.to_string());
            ui.end_row();
            ui.label("Compute");
            ui.label(format!("{:.0} TFLOPS", summary.total_tflops));
            ui.end_row();
            ui.label("Memory");
            ui.label(format!("{:.0} GB", summary.total_memory_gb));
            ui.end_row();
            ui.label("Power");
            ui.label(format!("{:.1} kW", summary.total_power_kw));
            ui.end_row();
            ui.label("Per rack");
            ui.colored_label(self.color(status), summary.rack.power_label().replace('\n', " · "));
            ui.end_row();
        });
        if summary.rack.near_capacity {
            ui.colored_label(self.color(ThemeToken::MetricWarning), "Rack is near its power capacity");
        }
    }

    fn floor_plan(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            for kind in PlacementKind::ALL {
                let (w, h) = kind.footprint();
                ui.selectable_value(&mut self.palette, kind, format!("{} ({w}×{h})", kind.label()));
            }
        });
        ui.horizontal(|ui| {
            if ui.button("Clear").clicked() {
                self.builder.grid.clear();
            }
            if ui.button("Export SVG").clicked() {
                self.export_svg(ui.ctx());
            }
            ui.label(format!("{:.0}% occupied", self.builder.grid.occupancy() * 100.0));
        });

        let size = self.builder.grid.size();
        let available = ui.available_rect_before_wrap();
        let cell = (available.width().min(available.height()) / size.max(1) as f32).max(4.0);
        let rect = egui::Rect::from_min_size(available.min, egui::vec2(cell, cell) * size as f32);
        let response = ui.allocate_rect(rect, egui::Sense::click());
        let painter = ui.painter_at(rect);

        painter.rect_filled(rect, egui::CornerRadius::ZERO, self.color(ThemeToken::GridBackground));
        let line = egui::Stroke::new(1.0, self.color(ThemeToken::GridLine));
        for i in 0..=size {
            let offset = i as f32 * cell;
            painter.line_segment(
                [rect.left_top() + egui::vec2(offset, 0.0), rect.left_bottom() + egui::vec2(offset, 0.0)],
                line,
            );
            painter.line_segment(
                [rect.left_top() + egui::vec2(0.0, offset), rect.right_top() + egui::vec2(0.0, offset)],
                line,
            );
        }

        let cell_rect = |x: i32, y: i32, w: u32, h: u32| {
            egui::Rect::from_min_size(
                rect.min + egui::vec2(x as f32 * cell, y as f32 * cell),
                egui::vec2(w as f32 * cell, h as f32 * cell),
            )
        };
        for c in self.builder.grid.components() {
            let r = cell_rect(c.x, c.y, c.width, c.height).shrink(2.0);
            painter.rect_filled(r, egui::CornerRadius::same(3), self.color(c.kind.theme_token()));
            painter.text(
                r.center(),
                egui::Align2::CENTER_CENTER,
                c.kind.label(),
                egui::FontId::proportional(theme::FONT_CAPTION),
                self.color(ThemeToken::Background),
            );
        }

        let Some(pos) = response.hover_pos() else {
            return;
        };
        let x = ((pos.x - rect.left()) / cell).floor() as i32;
        let y = ((pos.y - rect.top()) / cell).floor() as i32;
        let (w, h) = self.palette.footprint();
        let valid = self.builder.grid.can_place(x, y, w, h);
        let token = if valid {
            ThemeToken::PlacementValid
        } else {
            ThemeToken::PlacementInvalid
        };
        painter.rect_filled(cell_rect(x, y, w, h), egui::CornerRadius::ZERO, self.color(token));

        if response.clicked() && valid {
            self.builder.grid.place(self.palette, x, y);
        }
        if response.secondary_clicked()
            && let Some(id) = self.builder.grid.component_at(x, y).map(|c| c.id)
        {
            self.builder.grid.remove(id);
        }
    }

    fn export_svg(&mut self, ctx: &egui::Context) {
        let svg = self.builder.floor_plan_svg(40.0, self.theme_mode.is_dark());

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = ctx;
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("SVG", &["svg"])
                .set_file_name("floor-plan.svg")
                .save_file()
            {
                self.status = Some(match std::fs::write(&path, svg) {
                    Ok(()) => format!("Saved {}", path.display()),
                    Err(e) => format!("Failed to save floor plan: {e}"),
                });
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            ctx.copy_text(svg);
            self.status = Some("Floor plan SVG copied to clipboard".to_string());
        }
    }

    fn build_page(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("configurations")
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.configuration_list(ui));
            });
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Floor plan");
            ui.label(
                egui::RichText::new("Click to place, right-click to remove.")
                    .color(self.color(ThemeToken::TextMuted)),
            );
            self.floor_plan(ui);
        });
    }
}

/// GPU model picker. Returns `true` when the selection changed.
fn model_combo(ui: &mut egui::Ui, id: &str, model: &mut GpuModel) -> bool {
    let before = *model;
    egui::ComboBox::from_id_salt(id)
        .selected_text(model.spec().name)
        .show_ui(ui, |ui| {
            for m in GpuModel::ALL {
                ui.selectable_value(model, m, m.spec().name);
            }
        });
    *model != before
}

impl eframe::App for GpuVizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Top toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("gpuviz");
                ui.separator();
                for page in Page::ALL {
                    if ui.selectable_label(self.page == page, page.title()).clicked() {
                        self.page = page;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = match self.theme_mode {
                        ThemeMode::Dark => "Dark",
                        ThemeMode::Light => "Light",
                    };
                    if ui.button(label).clicked() {
                        self.toggle_theme(ctx);
                    }
                });
            });
        });

        // Status bar
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(status) = &self.status {
                    ui.label(status);
                    ui.separator();
                }
                let state = if self.animator.is_transitioning() {
                    "transitioning"
                } else {
                    "idle"
                };
                let view = self.current_view();
                let name = self
                    .animator
                    .views()
                    .get(&view)
                    .map_or(view.as_str(), |v| v.name.as_str());
                ui.label(format!(
                    "View: {name} ({state}) | Configurations: {} | Components: {}",
                    self.builder.configurations().len(),
                    self.builder.grid.components().len(),
                ));
            });
        });

        match self.page {
            Page::Home => {
                egui::CentralPanel::default().show(ctx, |ui| self.home_page(ui));
            }
            Page::Visualize => self.visualize_page(ctx),
            Page::Build => self.build_page(ctx),
        }

        if self.page != Page::Visualize {
            // Resume the thermal clock without a jump when coming back.
            self.last_frame = None;
        }
    }
}
