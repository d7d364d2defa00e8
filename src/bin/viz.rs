use std::path::PathBuf;

use eframe::egui;
use egui_plot::{Line, Plot};

use attitude_sim::config::SimConfig;
use attitude_sim::dynamics::state::StepResult;
use attitude_sim::io::load_errors;
use attitude_sim::sim;

fn main() -> eframe::Result {
    let input = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("attitude_errors_combined.csv"));

    let results = match load_errors(&input) {
        Ok(records) => match sim::run(&records, &SimConfig::default()) {
            Ok(results) => results,
            Err(e) => {
                eprintln!("simulation aborted: {e}");
                e.partial
            }
        },
        Err(e) => {
            eprintln!("failed to load {}: {e}", input.display());
            std::process::exit(1);
        }
    };

    let app = SimViz { results, title: input.display().to_string() };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("PID Attitude Simulation", options, Box::new(|_| Ok(Box::new(app))))
}

struct SimViz {
    results: Vec<StepResult>,
    title: String,
}

fn series(sampled: &[&StepResult], f: impl Fn(&StepResult) -> f64) -> Vec<[f64; 2]> {
    sampled.iter().map(|&r| [r.step_index as f64, f(r)]).collect()
}

impl eframe::App for SimViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let step = (self.results.len() / 2000).max(1);
        let sampled: Vec<&StepResult> = self.results.iter().step_by(step).collect();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading(format!("Input: {}", self.title));
            let peak = self
                .results
                .iter()
                .map(|r| r.torque.amax())
                .fold(0.0_f64, f64::max);
            ui.label(format!(
                "Steps: {}  |  Peak |correction|: {:.4}  |  Final orbit angle: {:.2} deg",
                self.results.len(),
                peak,
                self.results.last().map_or(0.0, |r| r.orbit_phase),
            ));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_h = available.y / 2.0 - 8.0;

            // PID corrections vs step
            ui.label("PID output");
            Plot::new("corrections")
                .height(half_h)
                .x_axis_label("Step")
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new("RA control", series(&sampled, |r| r.torque.x)));
                    plot_ui.line(Line::new("DEC control", series(&sampled, |r| r.torque.y)));
                    plot_ui.line(Line::new("Roll control", series(&sampled, |r| r.torque.z)));
                });

            ui.horizontal(|ui| {
                let half_w = available.x / 2.0 - 8.0;

                ui.vertical(|ui| {
                    ui.label("Attitude (deg)");
                    Plot::new("attitude")
                        .width(half_w)
                        .height(half_h - 24.0)
                        .x_axis_label("Step")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("RA", series(&sampled, |r| r.attitude.x)));
                            plot_ui.line(Line::new("DEC", series(&sampled, |r| r.attitude.y)));
                            plot_ui.line(Line::new("Roll", series(&sampled, |r| r.attitude.z)));
                        });
                });

                ui.vertical(|ui| {
                    ui.label("Orbit angle (deg)");
                    Plot::new("orbit")
                        .width(half_w)
                        .height(half_h - 24.0)
                        .x_axis_label("Step")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Orbit", series(&sampled, |r| r.orbit_phase)));
                        });
                });
            });
        });
    }
}
