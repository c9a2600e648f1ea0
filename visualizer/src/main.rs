use iced::{
    mouse, time,
    widget::{
        button,
        canvas::{self, Canvas, Frame, Geometry, Path, Stroke, Text},
        column, row, scrollable, text, text_input, Column, Container,
    },
    Alignment, Color, Element, Length, Pixels, Point, Rectangle, Renderer, Subscription, Task,
    Theme,
};
use lasercore::analysis::{parse_response, AnalysisReport, AnalysisVerdict};
use lasercore::display::{DisplaySnapshot, IndicatorLeds};
use lasercore::target::{PointObservation, ProximitySignal, TargetGeometry};
use lasercore::telemetry::FeedMetrics;
use std::{
    path::Path as FsPath,
    time::{Duration, Instant},
};

/// How long a hit marker stays on the target after the hit.
const HIT_MARKER_LIFETIME: Duration = Duration::from_millis(500);

fn main() -> iced::Result {
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Laser Tracking".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    time::every(Duration::from_millis(250)).map(|_| Message::Tick)
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug)]
struct Visualizer {
    form: SettingsForm,
    geometry: TargetGeometry,
    snapshot: Option<DisplaySnapshot>,
    status: String,
    analysis_status: String,
    report: Option<AnalysisReport>,
    history: Vec<String>,
    last_hit_at: Option<Instant>,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    SnapshotFetched(Result<DisplaySnapshot, String>),
    GeometryFetched(Result<TargetGeometry, String>),
    FieldChanged(Field, String),
    SubmitAnalysis,
    AnalysisFinished(Result<AnalysisReport, String>),
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Server,
    AnalysisUrl,
    ImagePath,
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let form = SettingsForm::default();
        let server = form.server.clone();
        (
            Visualizer {
                form,
                geometry: TargetGeometry::reference(),
                snapshot: None,
                status: "Waiting for tracking server...".into(),
                analysis_status: "No image analysed yet".into(),
                report: None,
                history: Vec::new(),
                last_hit_at: None,
            },
            Task::perform(fetch_geometry(server), Message::GeometryFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => Task::perform(
                fetch_snapshot(state.form.server.clone()),
                Message::SnapshotFetched,
            ),
            Message::SnapshotFetched(Ok(snapshot)) => {
                let previous = state
                    .snapshot
                    .as_ref()
                    .map(|snapshot| snapshot.metrics)
                    .unwrap_or_default();
                if snapshot.metrics.scored > previous.scored {
                    state.push_history(shot_entry(&snapshot));
                }
                if fresh_hit(&previous, &snapshot.metrics) {
                    state.last_hit_at = Some(Instant::now());
                }
                state.status = snapshot.connection.describe();
                state.snapshot = Some(snapshot);
                Task::none()
            }
            Message::SnapshotFetched(Err(err)) => {
                state.status = format!("Error connecting to tracking server: {err}");
                Task::none()
            }
            Message::GeometryFetched(Ok(geometry)) => {
                state.geometry = geometry;
                Task::none()
            }
            Message::GeometryFetched(Err(err)) => {
                state.push_history(format!("Using reference target layout ({err})"));
                Task::none()
            }
            Message::FieldChanged(field, value) => {
                state.form.update_field(field, value);
                if matches!(field, Field::Server) {
                    return Task::perform(
                        fetch_geometry(state.form.server.clone()),
                        Message::GeometryFetched,
                    );
                }
                Task::none()
            }
            Message::SubmitAnalysis => {
                if state.form.image_path.trim().is_empty() {
                    state.analysis_status = "Choose an image to analyse first".into();
                    return Task::none();
                }
                state.analysis_status = "Analysing...".into();
                Task::perform(
                    post_analysis(
                        state.form.analysis_url.clone(),
                        state.form.image_path.trim().to_string(),
                    ),
                    Message::AnalysisFinished,
                )
            }
            Message::AnalysisFinished(Ok(report)) => {
                state.analysis_status = verdict_line(&report);
                state.push_history(format!("Analysis: {}", state.analysis_status));
                state.report = Some(report);
                Task::none()
            }
            Message::AnalysisFinished(Err(err)) => {
                state.analysis_status = format!("Analysis error: {err}");
                state.report = None;
                Task::none()
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let snapshot = state.snapshot.clone().unwrap_or_default();

        let score_line = match snapshot.score {
            Some(score) => text(format!("Score: {score}")).size(28),
            None => text("Score: -").size(28),
        };
        let laser_line = if snapshot.laser_detected {
            text("Laser: DETECTED").size(16)
        } else {
            text("Laser: NOT DETECTED").size(16)
        };
        let warning_line = text(snapshot.warning.clone().unwrap_or_default()).size(16);

        let target = Canvas::new(TargetView {
            geometry: state.geometry,
            hit: snapshot
                .last_point
                .filter(|_| hit_visible(state.last_hit_at, Instant::now())),
        })
        .width(Length::Fill)
        .height(Length::Fixed(480.0));

        let leds = Canvas::new(LedPanel { leds: snapshot.leds })
            .width(Length::Fixed(220.0))
            .height(Length::Fixed(130.0));

        let metrics = &snapshot.metrics;
        let counters = text(format!(
            "Scored {} | skipped {} | outside {} | transport errors {}",
            metrics.scored, metrics.skipped, metrics.out_of_bounds, metrics.transport_errors
        ))
        .size(12);

        let history_list = if state.history.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            state
                .history
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let tracking_column = column![
            text("Laser Tracking").size(26),
            row![score_line, laser_line]
                .spacing(20)
                .align_y(Alignment::Center),
            warning_line,
            target,
            counters,
            text(&state.status).size(14),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fill);

        let mut report_column = Column::new().spacing(4);
        if let Some(report) = &state.report {
            report_column = report_column
                .push(text(format!("Issue: {}", report.description_text())).size(13))
                .push(text(format!("Solution: {}", report.solution_text())).size(13));
        }

        let side_column = column![
            text("Indicators").size(20),
            leds,
            text("Tracking server").size(16),
            text_input("http://127.0.0.1:8765", &state.form.server)
                .on_input(|value| Message::FieldChanged(Field::Server, value))
                .padding(6),
            text("Error analysis").size(20),
            text_input("Analysis endpoint", &state.form.analysis_url)
                .on_input(|value| Message::FieldChanged(Field::AnalysisUrl, value))
                .padding(6),
            text_input("Image path", &state.form.image_path)
                .on_input(|value| Message::FieldChanged(Field::ImagePath, value))
                .padding(6),
            button("Analyse image")
                .on_press(Message::SubmitAnalysis)
                .padding(10),
            text(&state.analysis_status).size(14),
            report_column,
            text("Activity log").size(16),
            Container::new(scrollable(history_list).height(Length::Fixed(140.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(360.0));

        let layout = row![tracking_column, side_column]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn push_history(&mut self, entry: String) {
        self.history.push(entry);
        if self.history.len() > 20 {
            self.history.remove(0);
        }
    }
}

fn shot_entry(snapshot: &DisplaySnapshot) -> String {
    let shot = snapshot.metrics.scored;
    match (snapshot.in_bounds, snapshot.score) {
        (Some(false), _) => format!("Shot {shot}: outside target"),
        (_, Some(score)) => match snapshot.proximity_signal {
            Some(ProximitySignal::CenterHit) => format!("Shot {shot}: {score} (center hit)"),
            _ => format!("Shot {shot}: {score}"),
        },
        _ => format!("Shot {shot}"),
    }
}

fn fresh_hit(previous: &FeedMetrics, current: &FeedMetrics) -> bool {
    current.hits() > previous.hits()
}

fn hit_visible(last_hit_at: Option<Instant>, now: Instant) -> bool {
    last_hit_at.is_some_and(|at| now.saturating_duration_since(at) < HIT_MARKER_LIFETIME)
}

fn verdict_line(report: &AnalysisReport) -> String {
    match report.verdict() {
        AnalysisVerdict::Detected {
            category,
            confidence,
        } => format!("Detected {category} ({:.0}% confidence)", confidence * 100.0),
        AnalysisVerdict::Uncertain { confidence } => format!(
            "Uncertain, low confidence ({:.0}%)",
            confidence * 100.0
        ),
        AnalysisVerdict::Unrecognised { label, confidence } => {
            format!("Unrecognised result `{label}` ({:.0}%)", confidence * 100.0)
        }
    }
}

async fn fetch_snapshot(server: String) -> Result<DisplaySnapshot, String> {
    let response = reqwest::get(format!("{}/display", server.trim_end_matches('/')))
        .await
        .map_err(|e| e.to_string())?;
    response
        .json::<DisplaySnapshot>()
        .await
        .map_err(|e| e.to_string())
}

async fn fetch_geometry(server: String) -> Result<TargetGeometry, String> {
    let response = reqwest::get(format!("{}/geometry", server.trim_end_matches('/')))
        .await
        .map_err(|e| e.to_string())?;
    let geometry = response
        .json::<TargetGeometry>()
        .await
        .map_err(|e| e.to_string())?;
    geometry.validate().map_err(|e| e.to_string())?;
    Ok(geometry)
}

async fn post_analysis(url: String, image_path: String) -> Result<AnalysisReport, String> {
    let bytes = tokio::fs::read(&image_path)
        .await
        .map_err(|e| format!("{image_path}: {e}"))?;
    let file_name = FsPath::new(&image_path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.jpg".into());
    let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
    let form = reqwest::multipart::Form::new().part("image", part);

    let client = reqwest::Client::new();
    let response = client
        .post(url)
        .multipart(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = response.status();
    let body = response.text().await.map_err(|e| e.to_string())?;
    parse_response(&body).map_err(|err| format!("{status}: {err}"))
}

#[derive(Debug, Clone)]
struct SettingsForm {
    server: String,
    analysis_url: String,
    image_path: String,
}

impl Default for SettingsForm {
    fn default() -> Self {
        Self {
            server: "http://127.0.0.1:8765".into(),
            analysis_url: "http://127.0.0.1:5000/api/analyze".into(),
            image_path: String::new(),
        }
    }
}

impl SettingsForm {
    fn update_field(&mut self, field: Field, value: String) {
        match field {
            Field::Server => self.server = value,
            Field::AnalysisUrl => self.analysis_url = value,
            Field::ImagePath => self.image_path = value,
        }
    }
}

/// Virtual target drawn in the same 1024×768 space the tracker reports in.
#[derive(Clone)]
struct TargetView {
    geometry: TargetGeometry,
    hit: Option<PointObservation>,
}

impl TargetView {
    fn transform(bounds: Rectangle) -> (f32, Point) {
        let scale = (bounds.width / TargetGeometry::REFERENCE_WIDTH as f32)
            .min(bounds.height / TargetGeometry::REFERENCE_HEIGHT as f32);
        let offset = Point::new(
            (bounds.width - TargetGeometry::REFERENCE_WIDTH as f32 * scale) / 2.0,
            (bounds.height - TargetGeometry::REFERENCE_HEIGHT as f32 * scale) / 2.0,
        );
        (scale, offset)
    }
}

impl canvas::Program<Message> for TargetView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            Color::from_rgb(0.02, 0.02, 0.04),
        );

        let (scale, offset) = Self::transform(bounds);
        let to_canvas =
            |x: f64, y: f64| Point::new(offset.x + x as f32 * scale, offset.y + y as f32 * scale);
        let center = to_canvas(self.geometry.center_x, self.geometry.center_y);
        let ring_count = self.geometry.ring_count();

        for ring in 1..=ring_count {
            let radius = self.geometry.ring_radius(ring) as f32 * scale;
            let color = if ring == ring_count {
                Color::from_rgb(1.0, 0.0, 0.0)
            } else {
                Color::WHITE
            };
            let ring_path = Path::new(|builder| builder.circle(center, radius));
            frame.stroke(&ring_path, Stroke::default().with_width(2.0).with_color(color));
            frame.fill_text(Text {
                content: ring.to_string(),
                position: Point::new(center.x + radius - 10.0 * scale, center.y - 10.0 * scale),
                color: Color::WHITE,
                size: Pixels(12.0),
                ..Text::default()
            });
        }

        let boundary = Path::new(|builder| {
            builder.circle(center, self.geometry.target_radius as f32 * scale)
        });
        frame.stroke(
            &boundary,
            Stroke::default()
                .with_width(2.0)
                .with_color(Color::from_rgb(0.0, 1.0, 0.0)),
        );

        let dot = Path::new(|builder| builder.circle(center, 2.0));
        frame.fill(&dot, Color::WHITE);

        let crosshair = Path::new(|builder| {
            let reach = 12.0 * scale;
            builder.move_to(Point::new(center.x - reach, center.y));
            builder.line_to(Point::new(center.x + reach, center.y));
            builder.move_to(Point::new(center.x, center.y - reach));
            builder.line_to(Point::new(center.x, center.y + reach));
        });
        frame.stroke(
            &crosshair,
            Stroke::default()
                .with_color(Color::from_rgb(0.35, 0.35, 0.45))
                .with_width(1.0),
        );

        if let Some(point) = self.hit {
            let hit = to_canvas(point.x, point.y);
            let marker = Path::new(|builder| builder.circle(hit, 5.0));
            frame.fill(&marker, Color::from_rgb(0.0, 0.0, 1.0));
            frame.stroke(&marker, Stroke::default().with_color(Color::WHITE));
        }

        vec![frame.into_geometry()]
    }
}

#[derive(Clone)]
struct LedPanel {
    leds: IndicatorLeds,
}

impl canvas::Program<Message> for LedPanel {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let off = Color::from_rgb(0.5, 0.5, 0.5);
        let lamps = [
            (self.leds.red, Color::from_rgb(1.0, 0.0, 0.0), IndicatorLeds::RED_LABEL),
            (self.leds.yellow, Color::from_rgb(1.0, 1.0, 0.0), IndicatorLeds::YELLOW_LABEL),
            (self.leds.green, Color::from_rgb(0.0, 1.0, 0.0), IndicatorLeds::GREEN_LABEL),
        ];

        for (idx, (lit, color, label)) in lamps.into_iter().enumerate() {
            let center = Point::new(24.0, 22.0 + idx as f32 * 40.0);
            let lamp = Path::new(|builder| builder.circle(center, 15.0));
            frame.fill(&lamp, if lit { color } else { off });
            frame.stroke(&lamp, Stroke::default().with_color(Color::WHITE));
            frame.fill_text(Text {
                content: label.to_string(),
                position: Point::new(center.x + 25.0, center.y - 8.0),
                color: Color::WHITE,
                size: Pixels(14.0),
                ..Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shot_entry_describes_miss_and_hit() {
        let mut snapshot = DisplaySnapshot {
            score: Some(10),
            in_bounds: Some(true),
            proximity_signal: Some(ProximitySignal::CenterHit),
            metrics: FeedMetrics {
                scored: 3,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(shot_entry(&snapshot), "Shot 3: 10 (center hit)");

        snapshot.in_bounds = Some(false);
        assert_eq!(shot_entry(&snapshot), "Shot 3: outside target");
    }

    #[test]
    fn only_on_target_shots_refresh_the_marker() {
        let before = FeedMetrics {
            scored: 2,
            out_of_bounds: 1,
            ..Default::default()
        };
        let miss = FeedMetrics {
            scored: 3,
            out_of_bounds: 2,
            ..Default::default()
        };
        let hit = FeedMetrics {
            scored: 3,
            out_of_bounds: 1,
            ..Default::default()
        };
        assert!(!fresh_hit(&before, &miss));
        assert!(fresh_hit(&before, &hit));
    }

    #[test]
    fn hit_marker_fades_after_half_a_second() {
        let at = Instant::now();
        assert!(!hit_visible(None, at));
        assert!(hit_visible(Some(at), at + Duration::from_millis(499)));
        assert!(!hit_visible(Some(at), at + HIT_MARKER_LIFETIME));
    }

    #[test]
    fn verdict_line_flags_low_confidence() {
        let report = AnalysisReport {
            category: Some("early_recoil".into()),
            confidence: 0.2,
            description: String::new(),
            solution: String::new(),
        };
        assert_eq!(verdict_line(&report), "Uncertain, low confidence (20%)");
    }

    #[test]
    fn transform_fits_reference_canvas() {
        let (scale, offset) = TargetView::transform(Rectangle::new(
            Point::ORIGIN,
            iced::Size::new(512.0, 480.0),
        ));
        assert_eq!(scale, 0.5);
        assert_eq!(offset.x, 0.0);
        assert_eq!(offset.y, (480.0 - 384.0) / 2.0);
    }
}
