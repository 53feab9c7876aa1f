//! Side and bottom panels: variation settings, net list and statistics.

use eframe::egui::{self, DragValue, RichText};
use egui_plot::{HLine, Line, Plot, PlotPoints};
use lwv_shared::{
    domain::PrimitiveId,
    geometry::Net,
    protocol::{Settings, SettingsPatch, VariationModel, VariationStats},
};

use crate::ui::theme;

/// Nets whose name contains `query` (case-insensitive) or that own a
/// primitive whose id contains it. Matching nets keep all their primitives.
pub fn filter_nets<'a>(nets: &'a [Net], query: &str) -> Vec<&'a Net> {
    let lowered = query.to_lowercase();
    nets.iter()
        .filter(|net| {
            net.name.to_lowercase().contains(&lowered)
                || net
                    .primitives
                    .iter()
                    .any(|primitive| primitive.id.to_string().contains(query))
        })
        .collect()
}

/// Returns the primitive clicked in the list, if any.
pub fn show_nets_panel(
    ui: &mut egui::Ui,
    nets: &[Net],
    selected: Option<&PrimitiveId>,
    filter: &mut String,
) -> Option<PrimitiveId> {
    ui.heading("Nets");
    ui.add(
        egui::TextEdit::singleline(filter)
            .hint_text("Filter nets...")
            .desired_width(f32::INFINITY),
    );
    ui.separator();

    let mut clicked = None;
    egui::ScrollArea::vertical()
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            if nets.is_empty() {
                ui.weak("Open a design to list its nets");
            }
            for net in filter_nets(nets, filter) {
                ui.label(RichText::new(&net.name).strong());
                for primitive in &net.primitives {
                    let is_selected = selected == Some(&primitive.id);
                    let text = format!("Path {} ({})", primitive.id, primitive.layer);
                    if ui.selectable_label(is_selected, text).clicked() {
                        clicked = Some(primitive.id.clone());
                    }
                }
            }
        });
    clicked
}

/// Fields that differ between `before` and `after`.
pub fn settings_diff(before: &Settings, after: &Settings) -> SettingsPatch {
    fn changed<T: PartialEq + Copy>(before: T, after: T) -> Option<T> {
        (before != after).then_some(after)
    }
    SettingsPatch {
        sigma_w: changed(before.sigma_w, after.sigma_w),
        l_c: changed(before.l_c, after.l_c),
        model: changed(before.model, after.model),
        ds_arc: changed(before.ds_arc, after.ds_arc),
        n_resample: changed(before.n_resample, after.n_resample),
        w_min: changed(before.w_min, after.w_min),
        w_max: changed(before.w_max, after.w_max),
    }
}

pub struct SettingsPanelResponse {
    pub patch: SettingsPatch,
    pub generate: bool,
}

pub fn show_settings_panel(
    ui: &mut egui::Ui,
    settings: &Settings,
    can_generate: bool,
) -> SettingsPanelResponse {
    ui.heading("Settings");
    ui.separator();

    let mut draft = *settings;
    egui::Grid::new("variation_settings")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            ui.label("Sigma_w (%)");
            ui.add(DragValue::new(&mut draft.sigma_w).speed(0.1));
            ui.end_row();

            ui.label("L_c (Correlation Length)");
            ui.add(
                DragValue::new(&mut draft.l_c)
                    .speed(0.0001)
                    .max_decimals(6),
            );
            ui.end_row();

            ui.label("Model");
            egui::ComboBox::from_id_salt("variation_model")
                .selected_text(draft.model.label())
                .show_ui(ui, |ui| {
                    for model in VariationModel::ALL {
                        ui.selectable_value(&mut draft.model, model, model.label());
                    }
                });
            ui.end_row();

            ui.label("ds_arc");
            ui.add(
                DragValue::new(&mut draft.ds_arc)
                    .speed(0.00001)
                    .max_decimals(7),
            );
            ui.end_row();

            ui.label("n_resample");
            ui.add(DragValue::new(&mut draft.n_resample).speed(1.0));
            ui.end_row();

            ui.label("w_min (%)");
            ui.add(DragValue::new(&mut draft.w_min).speed(0.5));
            ui.end_row();

            ui.label("w_max (%)");
            ui.add(DragValue::new(&mut draft.w_max).speed(0.5));
            ui.end_row();
        });

    ui.add_space(8.0);
    let generate = ui
        .add_enabled(can_generate, egui::Button::new("Generate Variation"))
        .clicked();

    SettingsPanelResponse {
        patch: settings_diff(settings, &draft),
        generate,
    }
}

#[derive(Debug, PartialEq)]
pub enum StatsView<'a> {
    NoSelection,
    Loading,
    NoData,
    Chart(&'a VariationStats),
}

impl StatsView<'_> {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            StatsView::NoSelection => Some("Select a primitive to view stats"),
            StatsView::Loading => Some("Loading stats..."),
            StatsView::NoData => Some(
                "No variation data available for this primitive. Generate variation first.",
            ),
            StatsView::Chart(_) => None,
        }
    }
}

pub fn stats_view<'a>(
    selected: Option<&PrimitiveId>,
    loading: bool,
    stats: Option<&'a VariationStats>,
) -> StatsView<'a> {
    match (selected, stats) {
        (None, _) => StatsView::NoSelection,
        (Some(_), Some(stats)) => StatsView::Chart(stats),
        (Some(_), None) if loading => StatsView::Loading,
        (Some(_), None) => StatsView::NoData,
    }
}

pub fn show_stats_panel(ui: &mut egui::Ui, selected: Option<&PrimitiveId>, view: StatsView<'_>) {
    let StatsView::Chart(stats) = view else {
        ui.centered_and_justified(|ui| {
            ui.label(view.message().unwrap_or_default());
        });
        return;
    };

    let (w_lo, w_hi) = stats.width_range();
    ui.horizontal(|ui| {
        if let Some(id) = selected {
            ui.label(RichText::new(format!("Statistics - Primitive {id}")).strong());
        }
        ui.separator();
        ui.label(format!(
            "mean width {:.4}  range {:.4} .. {:.4}  arc length {:.5}  samples {}",
            stats.mu_w(),
            w_lo,
            w_hi,
            stats.arc_length(),
            stats.len()
        ));
    });

    Plot::new("width_variation")
        .x_axis_label("Path Length")
        .y_axis_label("Width")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let samples: PlotPoints = stats.samples().map(|(s, w)| [s, w]).collect();
            plot_ui.line(Line::new("width", samples).color(theme::ACCENT));
            plot_ui.hline(HLine::new("mean width", stats.mu_w()).color(theme::MEAN_WIDTH));
        });
}

#[cfg(test)]
mod tests {
    use lwv_shared::{
        geometry::{Point, Primitive},
        protocol::WireStats,
    };

    use super::*;

    fn net(name: &str, ids: &[PrimitiveId]) -> Net {
        Net {
            name: name.to_string(),
            primitives: ids
                .iter()
                .map(|id| Primitive {
                    id: id.clone(),
                    kind: "Path".to_string(),
                    layer: "TOP".to_string(),
                    width: 0.1,
                    points: vec![Point::new(0.0, 0.0)],
                })
                .collect(),
        }
    }

    #[test]
    fn filter_matches_net_name_case_insensitively() {
        let nets = vec![
            net("GND", &[PrimitiveId::Int(1)]),
            net("VCC_3V3", &[PrimitiveId::Int(2)]),
        ];
        let names: Vec<&str> = filter_nets(&nets, "vcc")
            .into_iter()
            .map(|net| net.name.as_str())
            .collect();
        assert_eq!(names, ["VCC_3V3"]);
    }

    #[test]
    fn filter_matches_primitive_ids_and_keeps_whole_net() {
        let nets = vec![
            net("GND", &[PrimitiveId::Int(101), PrimitiveId::Int(7)]),
            net("SIG", &["trace-9".into()]),
        ];
        let hits = filter_nets(&nets, "10");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].primitives.len(), 2);
        assert_eq!(filter_nets(&nets, "trace-").len(), 1);
        assert_eq!(filter_nets(&nets, "").len(), 2);
    }

    #[test]
    fn settings_diff_only_reports_changes() {
        let before = Settings::default();
        let after = Settings {
            sigma_w: 15.0,
            model: VariationModel::Gaussian,
            ..before
        };
        let patch = settings_diff(&before, &after);
        assert_eq!(patch.sigma_w, Some(15.0));
        assert_eq!(patch.model, Some(VariationModel::Gaussian));
        assert_eq!(patch.l_c, None);
        assert!(settings_diff(&before, &before).is_empty());
        assert_eq!(before.merged(&patch), after);
    }

    #[test]
    fn stats_view_covers_informational_states() {
        let id = PrimitiveId::Int(4);
        let stats = VariationStats::from_wire(
            id.clone(),
            WireStats {
                s: vec![0.0, 1.0],
                w_s: vec![99.0, 101.0],
                mu_w: 100.0,
            },
        )
        .expect("decode")
        .expect("present");

        assert_eq!(stats_view(None, true, None), StatsView::NoSelection);
        assert_eq!(stats_view(Some(&id), true, None), StatsView::Loading);
        assert_eq!(stats_view(Some(&id), false, None), StatsView::NoData);
        assert_eq!(
            stats_view(Some(&id), false, Some(&stats)),
            StatsView::Chart(&stats)
        );
        assert!(StatsView::NoData.message().is_some());
    }
}
