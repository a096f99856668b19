use crossbeam_channel::Receiver;
use eframe::egui;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::interfaces::VibrationDriver;
use crate::domain::models::{AppConfig, ControllerHandle, LoopState, VibrationPattern, MOTOR_MAX};
use crate::infrastructure::persistence::ConfigRepository;
use crate::usecase::intensity::SliderIntensity;
use crate::usecase::notices::Notice;
use crate::usecase::vibration_loop::VibrationController;

pub struct VibrationApp<D: VibrationDriver + 'static, R: ConfigRepository> {
    controller: VibrationController<D>,
    notice_rx: Receiver<Notice>,
    repository: R,
    config: AppConfig,
    sliders: Arc<SliderIntensity>,

    controllers: Vec<ControllerHandle>,
    selected: Option<ControllerHandle>,
    pattern: VibrationPattern,
    left_motor: u16,
    right_motor: u16,
    log_lines: Vec<String>,
}

impl<D: VibrationDriver + 'static, R: ConfigRepository> VibrationApp<D, R> {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        controller: VibrationController<D>,
        notice_rx: Receiver<Notice>,
        repository: R,
        config: AppConfig,
    ) -> Self {
        let sliders = Arc::new(SliderIntensity::new(config.manual_levels()));
        let mut app = Self {
            controller,
            notice_rx,
            repository,
            sliders,
            controllers: Vec::new(),
            selected: None,
            pattern: config.pattern,
            left_motor: config.left_motor,
            right_motor: config.right_motor,
            log_lines: vec!["Log started:".to_string()],
            config,
        };
        app.refresh_controllers();
        app
    }

    fn refresh_controllers(&mut self) {
        self.controllers = self.controller.list_connected_controllers();
        info!("Connected controllers: {:?}", self.controllers);

        // Keep the previous choice only if it still answers.
        let preferred = self.selected.or_else(|| self.config.target_controller());
        self.selected = preferred.filter(|c| self.controllers.contains(c));
    }

    fn drain_notices(&mut self) {
        self.log_lines.extend(self.notice_rx.try_iter().map(|notice| notice.message));
    }

    fn push_log(&mut self, message: String) {
        info!("{}", message);
        self.log_lines.push(message);
    }

    fn current_config(&self) -> AppConfig {
        AppConfig {
            target_controller_index: self.selected.map(|c| c.index()),
            pattern: self.pattern,
            left_motor: self.left_motor,
            right_motor: self.right_motor,
            tick_interval_ms: self.config.tick_interval_ms,
        }
    }

    fn show_controller_row(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let selected_text = self
                .selected
                .map(|c| c.to_string())
                .unwrap_or_else(|| "Select a controller".to_string());

            egui::ComboBox::from_label("Connected controllers")
                .selected_text(selected_text)
                .show_ui(ui, |ui| {
                    for c in &self.controllers {
                        ui.selectable_value(&mut self.selected, Some(*c), c.to_string());
                    }
                });

            if ui.button("Refresh").clicked() {
                self.refresh_controllers();
            }
        });

        if self.controllers.is_empty() {
            ui.colored_label(egui::Color32::RED, "No controllers found");
        }
    }

    fn show_sliders(&mut self, ui: &mut egui::Ui) {
        ui.label("Left motor strength");
        if ui.add(egui::Slider::new(&mut self.left_motor, 0..=MOTOR_MAX)).changed() {
            self.sliders.set_left(self.left_motor);
        }

        ui.label("Right motor strength");
        if ui.add(egui::Slider::new(&mut self.right_motor, 0..=MOTOR_MAX)).changed() {
            self.sliders.set_right(self.right_motor);
        }
    }

    fn show_pattern_selector(&mut self, ui: &mut egui::Ui) {
        let before = self.pattern;
        egui::ComboBox::from_label("Pattern")
            .selected_text(self.pattern.to_string())
            .show_ui(ui, |ui| {
                for pattern in VibrationPattern::ALL {
                    ui.selectable_value(&mut self.pattern, pattern, pattern.to_string());
                }
            });

        if self.pattern != before {
            self.push_log(format!("Selected vibration pattern: {}", self.pattern));
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Start").clicked() {
                // Rejections are already reported as notices.
                let _ = self.controller.start(self.selected, self.pattern, self.sliders.clone());
            }
            if ui.button("Stop").clicked() {
                let _ = self.controller.stop();
            }
        });

        let status = self.controller.status();
        ui.horizontal(|ui| {
            ui.label("State: ");
            match status.state {
                LoopState::Running => ui.colored_label(egui::Color32::GREEN, "Running"),
                LoopState::Stopped => ui.label("Stopped"),
            };
            if let Some(c) = status.controller {
                ui.separator();
                ui.label(c.to_string());
            }
            ui.separator();
            ui.label(status.last_levels.to_string());
            ui.separator();
            ui.label(format!("t = {:.1}", status.virtual_time));
        });
    }

    fn show_log(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for line in &self.log_lines {
                    ui.label(line);
                }
            });
    }
}

impl<D: VibrationDriver + 'static, R: ConfigRepository> eframe::App for VibrationApp<D, R> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Keep the status line fresh while the loop thread runs.
        ctx.request_repaint_after(Duration::from_millis(100));
        self.drain_notices();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Xbox Controller Vibration");
            ui.separator();

            self.show_controller_row(ui);
            ui.add_space(8.0);
            self.show_sliders(ui);
            ui.add_space(8.0);
            self.show_pattern_selector(ui);
            ui.add_space(8.0);
            self.show_controls(ui);

            ui.separator();
            ui.label(egui::RichText::new("Log").strong());
            self.show_log(ui);
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.controller.shutdown();

        let config = self.current_config();
        if let Err(e) = self.repository.save(&config) {
            error!("Failed to save config: {}", e);
        }
    }
}
