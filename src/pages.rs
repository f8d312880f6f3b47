//! Page routing and HTML rendering.
//!
//! Every render is a pure function of its inputs; nothing is remembered
//! between requests.

use crate::form::{FormError, Submission};
use crate::predict::ModelKind;
use crate::schema::{Control, FieldSpec, FormSchema, ENGINE_HP_FORM, FUEL_TYPE_FORM};
use crate::types::Prediction;
use maud::{html, Markup, PreEscaped, DOCTYPE};

pub const APP_TITLE: &str = "Vehicle Attribute Insights";
pub const DASHBOARD_IMAGE: &str = "dashboard.svg";
pub const WORKFLOW_IMAGE: &str = "orange_workflow.svg";

const STYLE: &str = r#"
body { margin: 0; display: flex; min-height: 100vh; background-color: #97f1ee; color: #2c9cec; font-family: sans-serif; }
.sidebar { width: 15rem; padding: 1rem; background-color: #68ceef; }
.sidebar h2 { color: #ffffff; }
.sidebar a { display: block; padding: .4rem .6rem; color: #ffffff; text-decoration: none; border-radius: 6px; }
.sidebar a:hover, .sidebar a.active { background-color: #2c9cec; }
main { flex: 1; padding: 1.5rem 2.5rem; }
h1, h2, h3, h4 { color: #2c9cec; }
.field { margin: .8rem 0; }
.field > label { display: block; font-weight: bold; margin-bottom: .2rem; }
input[type=text], input[type=number], select { background-color: #ffffff; color: #2c9cec; padding: .3rem; }
input:focus, select:focus { border-color: #2c9cec; }
button { background-color: #68ceef; color: white; border: 0; border-radius: 10px; font-weight: bold; padding: .5rem 1rem; }
button:hover { background-color: #2c9cec; }
.success { background: #dff5e1; color: #1e6b2a; padding: .8rem; border-radius: 6px; }
.error { background: #fde2e2; color: #8a1c1c; padding: .8rem; border-radius: 6px; }
figure img { max-width: 100%; }
"#;

// ---------- Router ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Introduction,
    Dashboard,
    ModelDevelopment,
    FuelTypePrediction,
    EngineHpPrediction,
}

impl Page {
    pub const ALL: [Page; 5] = [
        Page::Introduction,
        Page::Dashboard,
        Page::ModelDevelopment,
        Page::FuelTypePrediction,
        Page::EngineHpPrediction,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Page::Introduction => "introduction",
            Page::Dashboard => "dashboard",
            Page::ModelDevelopment => "model-development",
            Page::FuelTypePrediction => "fuel-type-prediction",
            Page::EngineHpPrediction => "engine-hp-prediction",
        }
    }

    /// Entry in the navigation selector.
    pub fn label(&self) -> &'static str {
        match self {
            Page::Introduction => "Introduction",
            Page::Dashboard => "Dashboard",
            Page::ModelDevelopment => "Model Development",
            Page::FuelTypePrediction => "Fuel Type Prediction",
            Page::EngineHpPrediction => "Engine HP Prediction",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Introduction => "Predictive Modeling and Analysis of Vehicle Attributes",
            Page::Dashboard => "Vehicle Attribute Insights Dashboard",
            Page::ModelDevelopment => "Model Development Using Orange Data Mining",
            Page::FuelTypePrediction => "Vehicle Fuel Type Prediction",
            Page::EngineHpPrediction => "Vehicle Engine Horsepower Prediction",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Page> {
        Page::ALL.into_iter().find(|p| p.slug() == slug)
    }

    pub fn href(&self) -> String {
        format!("/pages/{}", self.slug())
    }

    pub fn model_kind(&self) -> Option<ModelKind> {
        match self {
            Page::FuelTypePrediction => Some(ModelKind::FuelType),
            Page::EngineHpPrediction => Some(ModelKind::EngineHp),
            _ => None,
        }
    }

    pub fn schema(&self) -> Option<&'static FormSchema> {
        match self.model_kind()? {
            ModelKind::FuelType => Some(&FUEL_TYPE_FORM),
            ModelKind::EngineHp => Some(&ENGINE_HP_FORM),
        }
    }
}

/// What to show under a prediction form.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Nothing,
    Invalid(Vec<FormError>),
    Predicted(Prediction),
    Failed(String),
}

// ---------- Layout ----------

fn layout(active: Option<Page>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (APP_TITLE) }
                style { (PreEscaped(STYLE)) }
            }
            body {
                nav.sidebar {
                    h2 { "Navigation" }
                    @for page in Page::ALL {
                        a.active[active == Some(page)] href=(page.href()) { (page.label()) }
                    }
                }
                main { (content) }
            }
        }
    }
}

// ---------- Static pages ----------

pub fn render_static(page: Page, dashboard_url: &str) -> Markup {
    let content = match page {
        Page::Introduction => html! {
            h1 { (page.title()) }
            h3 { "Insights into Fuel Types, Engine Performance, and Market Trends" }
            p { "This application showcases the power of predictive modeling in analyzing vehicle attributes. It features:" }
            ul {
                li { "A Tableau Dashboard providing visual insights." }
                li { "A detailed guide on developing predictive models using Orange Data Mining." }
                li {
                    "Predictive tools for determining:"
                    ul {
                        li { "Vehicle fuel type based on attributes." }
                        li { "Engine horsepower based on vehicle specifications." }
                    }
                }
            }
        },
        Page::Dashboard => html! {
            h1 { (page.title()) }
            p {
                "This dashboard provides a comprehensive analysis of vehicle data, offering insights into pricing, performance, fuel efficiency, and market trends. "
                "Designed for automotive enthusiasts, analysts, and decision-makers, it combines key metrics and visualizations to reveal patterns across different makes, models, and years."
            }
            figure {
                img src={ "/assets/" (DASHBOARD_IMAGE) } alt="Snapshot of Tableau Dashboard";
                figcaption { "Snapshot of Tableau Dashboard" }
            }
            p { a href=(dashboard_url) target="_blank" rel="noopener" { "View Interactive Dashboard" } }
        },
        Page::ModelDevelopment => html! {
            h1 { (page.title()) }
            h3 { "How We Developed the Predictive Model" }
            ul {
                li { strong { "Data Cleaning" } ": Preprocessed data to handle missing values and inconsistencies." }
                li { strong { "Feature Selection" } ": Selected attributes such as engine size, vehicle type, and market category." }
                li { strong { "Model Training" } ": Trained the model using Orange's visual workflow with classification techniques." }
                li { strong { "Evaluation" } ": Evaluated performance metrics like accuracy and F1-score." }
            }
            figure {
                img src={ "/assets/" (WORKFLOW_IMAGE) } alt="Orange Data Mining Workflow";
                figcaption { "Orange Data Mining Workflow" }
            }
        },
        Page::FuelTypePrediction | Page::EngineHpPrediction => {
            return render_prediction(page, None, &Outcome::Nothing);
        }
    };
    layout(Some(page), content)
}

// ---------- Prediction pages ----------

fn intro(page: Page) -> Markup {
    match page {
        Page::FuelTypePrediction => html! {
            p { "Enter the details of a vehicle to predict its fuel type." }
            h3 { "Enter Vehicle Details for Prediction" }
            p { "Fill in the vehicle details below to get the predicted fuel type." }
        },
        _ => html! {
            p { "Enter vehicle specifications to predict engine horsepower." }
        },
    }
}

fn button_label(page: Page) -> &'static str {
    match page {
        Page::FuelTypePrediction => "Predict Fuel Type",
        _ => "Predict Engine HP",
    }
}

/// Prediction page with its form. `submitted` echoes the last submission
/// back into the controls; `None` shows the defaults.
pub fn render_prediction(page: Page, submitted: Option<&Submission>, outcome: &Outcome) -> Markup {
    let Some(schema) = page.schema() else {
        return render_not_found(&page.href());
    };

    let content = html! {
        h1 { (page.title()) }
        (intro(page))
        form method="post" action=(page.href()) id=(schema.id) {
            @for (i, field) in schema.fields.iter().enumerate() {
                (render_field(schema, i, field, submitted))
            }
            button type="submit" { (button_label(page)) }
        }
        (render_outcome(page, outcome))
    };
    layout(Some(page), content)
}

/// A prediction page whose model could not be loaded: title and the error,
/// nothing below it.
pub fn render_unavailable(page: Page, error: &str) -> Markup {
    layout(
        Some(page),
        html! {
            h1 { (page.title()) }
            div.error { "Model could not be loaded: " (error) }
        },
    )
}

pub fn render_not_found(path: &str) -> Markup {
    layout(
        None,
        html! {
            h1 { "Page not found" }
            p { "No page named '" (path) "'." }
        },
    )
}

fn render_outcome(page: Page, outcome: &Outcome) -> Markup {
    match outcome {
        Outcome::Nothing => html! {},
        Outcome::Invalid(errors) => html! {
            div.error {
                "Please correct the following:"
                ul { @for e in errors { li { (e.to_string()) } } }
            }
        },
        Outcome::Failed(e) => html! {
            div.error { "Error during prediction: " (e) }
        },
        Outcome::Predicted(p) => match page {
            Page::EngineHpPrediction => html! {
                div.success { "The predicted engine horsepower is: " strong { (p.to_string()) " HP" } }
            },
            _ => html! {
                p.result { "The predicted engine fuel type is: " strong { (p.to_string()) } }
            },
        },
    }
}

fn current_value(field: &FieldSpec, submitted: Option<&Submission>) -> String {
    if let Some(raw) = submitted.and_then(|s| s.raw_value(field.feature)) {
        if !raw.is_empty() {
            return raw.to_string();
        }
    }
    match &field.control {
        Control::Integer { default, .. } | Control::Slider { default, .. } => default.to_string(),
        Control::Radio { choices } | Control::Select { choices } => {
            choices.first().copied().unwrap_or_default().to_string()
        }
        Control::Text { .. } | Control::MultiSelect { .. } => String::new(),
    }
}

fn render_field(schema: &FormSchema, index: usize, field: &FieldSpec, submitted: Option<&Submission>) -> Markup {
    let id = format!("{}-{}", schema.id, index);
    let value = current_value(field, submitted);

    html! {
        div.field {
            @match &field.control {
                Control::Text { placeholder } => {
                    label for=(id) { (field.label) }
                    input type="text" id=(id) name=(field.feature) value=(value)
                        placeholder=[(!placeholder.is_empty()).then_some(*placeholder)];
                }
                Control::Integer { min, max, step, .. } => {
                    label for=(id) { (field.label) }
                    input type="number" id=(id) name=(field.feature) value=(value)
                        min=(min) max=[*max] step="1" data-step=(step);
                }
                Control::Slider { min, max, step, .. } => {
                    label for=(id) { (field.label) }
                    input type="range" id=(id) name=(field.feature) value=(value)
                        min=(min) max=(max) step=(step);
                    output for=(id) { (value) }
                }
                Control::Radio { choices } => {
                    label { (field.label) }
                    @for (k, choice) in choices.iter().enumerate() {
                        label.choice {
                            input type="radio" id={ (id) "-" (k) } name=(field.feature) value=(choice)
                                checked[*choice == value];
                            " " (choice)
                        }
                    }
                }
                Control::Select { choices } => {
                    label for=(id) { (field.label) }
                    select id=(id) name=(field.feature) {
                        @for choice in choices.iter() {
                            option value=(choice) selected[*choice == value] { (choice) }
                        }
                    }
                }
                Control::MultiSelect { choices } => {
                    label for=(id) { (field.label) }
                    select id=(id) name=(field.feature) multiple {
                        @for choice in choices.iter() {
                            option value=(choice) selected[value.split(", ").any(|v| v == *choice)] { (choice) }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form;

    #[test]
    fn slugs_round_trip_and_titles_are_distinct() {
        for page in Page::ALL {
            assert_eq!(Page::from_slug(page.slug()), Some(page));
        }
        let mut titles: Vec<_> = Page::ALL.iter().map(|p| p.title()).collect();
        titles.sort();
        titles.dedup();
        assert_eq!(titles.len(), 5);
        assert_eq!(Page::from_slug("settings"), None);
    }

    #[test]
    fn only_prediction_pages_have_forms() {
        let with_forms: Vec<_> = Page::ALL.into_iter().filter(|p| p.schema().is_some()).collect();
        assert_eq!(with_forms, vec![Page::FuelTypePrediction, Page::EngineHpPrediction]);
    }

    #[test]
    fn dashboard_links_out_and_uses_relative_image() {
        let html = render_static(Page::Dashboard, "https://example.test/dash").into_string();
        assert!(html.contains(r#"href="https://example.test/dash""#));
        assert!(html.contains(r#"src="/assets/dashboard.svg""#));
        assert!(!html.contains("/Users/"));
    }

    #[test]
    fn active_page_is_marked_in_sidebar() {
        let html = render_static(Page::ModelDevelopment, "").into_string();
        assert_eq!(html.matches("class=\"active\"").count(), 1);
        let active = html
            .split("<a ")
            .find(|tag| tag.contains("class=\"active\""))
            .unwrap();
        assert!(active.contains("href=\"/pages/model-development\""));
    }

    #[test]
    fn default_form_shows_defaults() {
        let html = render_prediction(Page::EngineHpPrediction, None, &Outcome::Nothing).into_string();
        assert!(html.contains(r#"name="Year" value="2022" min="1900" max="2024" step="1""#));
        assert!(html.contains(r#"name="MSRP" value="35000" min="0" step="1" data-step="1000""#));
        assert!(html.contains(r#"value="Automatic" checked"#));
        assert!(!html.contains("Error during prediction"));
    }

    #[test]
    fn submitted_values_are_echoed() {
        let raw = vec![
            ("Make".to_string(), "Toyota".to_string()),
            ("Vehicle Size".to_string(), "Large".to_string()),
        ];
        let sub = form::submit(&FUEL_TYPE_FORM, &raw);
        let html = render_prediction(Page::FuelTypePrediction, Some(&sub), &Outcome::Nothing).into_string();
        assert!(html.contains(r#"name="Make" value="Toyota""#));
        assert!(html.contains(r#"<option value="Large" selected>"#));
    }

    #[test]
    fn outcomes_render() {
        let p = Page::EngineHpPrediction;
        let ok = render_prediction(p, None, &Outcome::Predicted(Prediction::Value(245.5))).into_string();
        assert!(ok.contains("The predicted engine horsepower is: <strong>245.5 HP</strong>"));
        assert!(ok.contains(r#"class="success""#));

        let failed = render_prediction(p, None, &Outcome::Failed("boom".into())).into_string();
        assert!(failed.contains("Error during prediction: boom"));
    }

    #[test]
    fn user_text_is_escaped() {
        let raw = vec![("Make".to_string(), "<script>".to_string())];
        let sub = form::submit(&FUEL_TYPE_FORM, &raw);
        let html = render_prediction(Page::FuelTypePrediction, Some(&sub), &Outcome::Nothing).into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn number_inputs_accept_values_between_steps() {
        let raw = vec![("MSRP".to_string(), "35500".to_string())];
        let sub = form::submit(&ENGINE_HP_FORM, &raw);
        assert!(sub.result.is_ok());

        let html = render_prediction(Page::EngineHpPrediction, Some(&sub), &Outcome::Nothing).into_string();
        assert!(html.contains(r#"name="MSRP" value="35500" min="0" step="1" data-step="1000""#));
        assert!(!html.contains(r#" step="1000""#));
    }

    #[test]
    fn pages_without_forms_have_no_prediction_view() {
        let html = render_prediction(Page::Dashboard, None, &Outcome::Nothing).into_string();
        assert!(html.contains("Page not found"));
        assert!(!html.contains("<form"));
    }
}
