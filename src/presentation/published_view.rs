// Published view - Renderer and chart library backed by a watch channel the HTTP layer reads
use crate::application::chart_bindings::{ChartData, ChartId, ChartLibrary, ChartSpec};
use crate::application::renderer::{Field, Renderer};
use crate::domain::panel::Panel;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Serialize)]
pub struct PublishedChart {
    pub spec: ChartSpec,
    pub tooltip_unit: &'static str,
    pub data: ChartData,
    pub revision: u64,
}

/// Everything a front-end needs to draw the dashboard.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PublishedView {
    pub panel: Panel,
    pub drag_offset_px: f64,
    pub fields: BTreeMap<Field, String>,
    pub classes: BTreeMap<Field, String>,
    pub charts: BTreeMap<ChartId, PublishedChart>,
}

pub fn channel() -> (ViewPublisher, ChartRegistry, watch::Receiver<PublishedView>) {
    let (tx, rx) = watch::channel(PublishedView::default());
    let tx = Arc::new(tx);
    (
        ViewPublisher { tx: tx.clone() },
        ChartRegistry { tx, next_id: 0 },
        rx,
    )
}

pub struct ViewPublisher {
    tx: Arc<watch::Sender<PublishedView>>,
}

impl Renderer for ViewPublisher {
    fn set_text(&mut self, field: Field, text: &str) {
        self.tx.send_modify(|view| {
            view.fields.insert(field, text.to_string());
        });
    }

    fn set_class(&mut self, field: Field, class: Option<&str>) {
        self.tx.send_modify(|view| match class {
            Some(class) => {
                view.classes.insert(field, class.to_string());
            }
            None => {
                view.classes.remove(&field);
            }
        });
    }

    fn show_panel(&mut self, panel: Panel, drag_offset_px: f64) {
        self.tx.send_modify(|view| {
            view.panel = panel;
            view.drag_offset_px = drag_offset_px;
        });
    }
}

/// Retained chart instances, keyed by the id handed back from `create`.
pub struct ChartRegistry {
    tx: Arc<watch::Sender<PublishedView>>,
    next_id: u64,
}

impl ChartLibrary for ChartRegistry {
    fn create(&mut self, spec: &ChartSpec, data: &ChartData) -> ChartId {
        self.next_id += 1;
        let id = ChartId(self.next_id);
        let chart = PublishedChart {
            spec: spec.clone(),
            tooltip_unit: spec.tooltip_unit(),
            data: data.clone(),
            revision: 0,
        };
        self.tx.send_modify(|view| {
            view.charts.insert(id, chart);
        });
        id
    }

    fn update(&mut self, id: ChartId, data: &ChartData) {
        self.tx.send_modify(|view| match view.charts.get_mut(&id) {
            Some(chart) => {
                chart.data = data.clone();
                chart.revision += 1;
            }
            None => tracing::warn!("Update for unknown chart {:?}", id),
        });
    }

    fn destroy(&mut self, id: ChartId) {
        self.tx.send_modify(|view| {
            view.charts.remove(&id);
        });
    }
}
