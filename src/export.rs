//! PDF export of a saved therapy plan. Single-column A4 layout with
//! built-in fonts, no embedded assets.

use printpdf::*;
use std::io::BufWriter;
use thiserror::Error;

use crate::models::{GeneratedPlan, TherapyPlan};

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("PDF rendering failed: {0}")]
    Render(String),
}

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN_TOP: f32 = 280.0;
const MARGIN_BOTTOM: f32 = 20.0;

struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: Mm,
}

impl PdfWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page1, layer1) =
            PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Render(format!("font error: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| ExportError::Render(format!("font error: {e}")))?;
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: Mm(MARGIN_TOP),
        })
    }

    /// Starts a new page when the cursor would run off the bottom.
    fn ensure_room(&mut self, needed: f32) {
        if self.y.0 - needed < MARGIN_BOTTOM {
            let (page, layer) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = Mm(MARGIN_TOP);
        }
    }

    fn heading(&mut self, text: &str) {
        self.ensure_room(10.0);
        self.y -= Mm(4.0);
        self.layer.use_text(text, 11.0, Mm(20.0), self.y, &self.bold);
        self.y -= Mm(6.0);
    }

    fn paragraph(&mut self, text: &str) {
        for line in wrap_text(text, 80) {
            self.ensure_room(4.5);
            self.layer.use_text(&line, 9.0, Mm(25.0), self.y, &self.font);
            self.y -= Mm(4.5);
        }
        self.y -= Mm(2.0);
    }

    fn bullet(&mut self, text: &str) {
        let mut indent = Mm(25.0);
        for line in wrap_text(text, 76) {
            self.ensure_room(4.5);
            self.layer.use_text(&line, 9.0, indent, self.y, &self.font);
            self.y -= Mm(4.5);
            indent = Mm(28.0);
        }
    }

    fn finish(self) -> Result<Vec<u8>, ExportError> {
        let mut buf = BufWriter::new(Vec::new());
        self.doc
            .save(&mut buf)
            .map_err(|e| ExportError::Render(format!("save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| ExportError::Render(format!("buffer error: {e}")))
    }
}

/// Render a plan and its parsed blob to PDF bytes.
pub fn render_plan_pdf(plan: &TherapyPlan, data: &GeneratedPlan) -> Result<Vec<u8>, ExportError> {
    let title = if data.plan_title.is_empty() {
        "Therapy Plan"
    } else {
        &data.plan_title
    };
    let mut pdf = PdfWriter::new(title)?;

    pdf.layer.use_text(title, 14.0, Mm(20.0), pdf.y, &pdf.bold);
    pdf.y -= Mm(6.0);
    pdf.layer.use_text(
        format!(
            "{}, age {} | {} | Created {}",
            plan.patient_name,
            plan.patient_age,
            plan.diagnosis,
            plan.created_at.format("%Y-%m-%d")
        ),
        9.0,
        Mm(20.0),
        pdf.y,
        &pdf.font,
    );
    pdf.y -= Mm(4.5);
    pdf.layer.use_text(
        format!("Primary goal: {}", plan.primary_goal),
        9.0,
        Mm(20.0),
        pdf.y,
        &pdf.font,
    );
    pdf.y -= Mm(6.0);

    if !data.overview.is_empty() {
        pdf.heading("OVERVIEW");
        pdf.paragraph(&data.overview);
    }

    if !data.objectives.is_empty() {
        pdf.heading("OBJECTIVES");
        for obj in &data.objectives {
            pdf.bullet(&format!(
                "- {} ({}): {}",
                obj.goal, obj.timeframe, obj.measurable_outcome
            ));
        }
        pdf.y -= Mm(2.0);
    }

    if !data.activities.is_empty() {
        pdf.heading("ACTIVITIES");
        for activity in &data.activities {
            pdf.ensure_room(10.0);
            pdf.layer
                .use_text(&activity.name, 10.0, Mm(22.0), pdf.y, &pdf.bold);
            pdf.y -= Mm(5.0);
            pdf.paragraph(&activity.description);
            if !activity.duration.is_empty() {
                pdf.bullet(&format!("Duration: {}", activity.duration));
            }
            if !activity.materials.is_empty() {
                pdf.bullet(&format!("Materials: {}", activity.materials.join(", ")));
            }
            if !activity.adaptations.is_empty() {
                pdf.bullet(&format!("Adaptations: {}", activity.adaptations));
            }
            if !activity.progress_measures.is_empty() {
                pdf.bullet(&format!("Progress: {}", activity.progress_measures));
            }
            pdf.y -= Mm(3.0);
        }
    }

    if !data.weekly_schedule.is_empty() {
        pdf.heading("WEEKLY SCHEDULE");
        for week in &data.weekly_schedule {
            pdf.bullet(&format!(
                "Week {}: {} ({})",
                week.week,
                week.focus,
                week.activities.join(", ")
            ));
        }
        pdf.y -= Mm(2.0);
    }

    if !data.assessment_methods.is_empty() {
        pdf.heading("ASSESSMENT METHODS");
        for method in &data.assessment_methods {
            pdf.bullet(&format!("- {method}"));
        }
        pdf.y -= Mm(2.0);
    }

    if !data.recommendations.is_empty() {
        pdf.heading("RECOMMENDATIONS");
        for rec in &data.recommendations {
            pdf.bullet(&format!("- {rec}"));
        }
    }

    pdf.finish()
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.len() + word.len() + 1 > max_chars && !current.is_empty() {
            lines.push(current.clone());
            current.clear();
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Objective, PlanActivity, PlanStatus, WeekEntry};
    use chrono::Utc;
    use uuid::Uuid;

    fn sample() -> (TherapyPlan, GeneratedPlan) {
        let data = GeneratedPlan {
            plan_title: "Fine Motor Recovery".into(),
            overview: "Eight weeks of graded fine-motor work.".into(),
            objectives: vec![Objective {
                goal: "Improve grip".into(),
                measurable_outcome: "Hold 1kg for 10s".into(),
                timeframe: "4 weeks".into(),
            }],
            activities: vec![PlanActivity {
                name: "Clay modeling".into(),
                description: "Therapeutic sculpting.".into(),
                duration: "20 minutes".into(),
                materials: vec!["Clay".into()],
                adaptations: "Softer clay as needed.".into(),
                progress_measures: "Pieces per session".into(),
            }],
            weekly_schedule: vec![WeekEntry {
                week: 1,
                focus: "Baseline".into(),
                activities: vec!["Clay modeling".into()],
            }],
            assessment_methods: vec!["Dynamometer".into()],
            recommendations: vec!["Daily home practice".into()],
        };
        let plan = TherapyPlan {
            id: Uuid::new_v4(),
            owner_id: "u1".into(),
            patient_name: "Jane Doe".into(),
            patient_age: 72,
            diagnosis: "Stroke".into(),
            primary_goal: "Fine motor recovery".into(),
            plan_data: serde_json::to_string(&data).unwrap(),
            status: PlanStatus::Active,
            created_at: Utc::now(),
        };
        (plan, data)
    }

    #[test]
    fn renders_nonempty_pdf_bytes() {
        let (plan, data) = sample();
        let bytes = render_plan_pdf(&plan, &data).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn renders_plan_with_empty_sections() {
        let (plan, _) = sample();
        let bytes = render_plan_pdf(&plan, &GeneratedPlan::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_activity_list_spills_to_second_page() {
        let (plan, mut data) = sample();
        let base = data.activities[0].clone();
        data.activities = (0..40)
            .map(|i| PlanActivity {
                name: format!("Activity {i}"),
                ..base.clone()
            })
            .collect();
        let bytes = render_plan_pdf(&plan, &data).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn wrap_text_respects_width() {
        let lines = wrap_text("one two three four five six seven eight", 12);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.len() <= 12));
    }

    #[test]
    fn wrap_text_empty_yields_blank_line() {
        assert_eq!(wrap_text("", 80), vec![String::new()]);
    }
}
