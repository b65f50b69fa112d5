use iced::gradient::Linear;
use iced::keyboard;
use iced::widget::canvas::Canvas;
use iced::widget::{
    button, center, column, container, mouse_area, opaque, progress_bar, row, scrollable, stack, text,
    text_input, Column, Row, Space,
};
use iced::{
    Alignment, Background, Border, Color, Degrees, Element, Gradient, Length, Radians, Shadow, Subscription, Task, Theme,
    Vector,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

use crate::accessibility::{AccessibilityStore, SettingKey};
use crate::animation::{PageFade, Tween};
use crate::chart::{axis_max, CategoryChart, ChartColors, ChartKind, Datum};
use crate::feedback::{FeedbackValue, FeedbackWidget};
use crate::gamification::{
    filter_achievements, generate_achievements, generate_challenges, generate_goals, generate_leaderboard,
    generate_user_progress, is_on_fire, level_roadmap, partition_challenges, partition_goals, points_table, Achievement,
    AchievementCategory, Challenge, Goal, LeaderboardEntry, StatusFilter, TimeFilter, UserProgress,
};
use crate::gauge::{ProgressRing, RingColors, Sparkline};
use crate::habits::{
    app_usage_data, motion_pattern, network_pattern, pattern_summary, shows_mobile_data_warning, shows_usage_details,
    top_apps, MOBILE_DATA_WARNING,
};
use crate::impact::{ForestView, FOREST_SIZE, SCENARIOS};
use crate::mock_data::{
    behaviour_flags, calculate_carbon_impact, generate_charging_sessions, get_app_usage, get_behavior_insights,
    get_current_environment, get_time_based_insight, get_today_sessions, start_percent_distribution, CarbonData,
    ChargingSession, EnvironmentState,
};
use crate::navigation::{Route, NAV_ITEMS};
use crate::recommendations::{build_recommendations, is_in_motion, theme_summary, QUICK_TIPS};
use crate::research::{ElementInfo, GlobalEvent, Metadata, ResearchStore};
use crate::schedule::{active_timers, ChargingProbe, TimerKind};
use crate::share::{clipboard_text, share_text, share_url, SharePlatform};
use crate::storage::KeyValueStore;
use crate::theme::{
    battery_color, build_palette, charging_start_color, emission_color, emission_level, Palette, ThemeBackground,
    ThemeName,
};
use crate::theme_store::{ThemeMode, ThemeStore};

const RECENT_ACHIEVEMENTS: usize = 3;
const LEVEL_ROADMAP_STEPS: usize = 5;
const TIMELINE_SESSIONS: usize = 10;
const TREES_PER_ROW: usize = 5;
const FEEDBACK_SCOPE: &str = "recommendations";

// ─── MESSAGE & ENUMS ───────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum Message {
    Navigate(Route),
    EnvironmentTick,
    ChargingProbeTick,
    ThemeTick,
    AnimationTick,
    // Settings
    SetThemeMode(ThemeMode),
    ToggleAccessibility(SettingKey),
    ResetAccessibility,
    ToggleObservationMode,
    ToggleEventLogging,
    ClearEventLog,
    // Achievements
    SetStatusFilter(StatusFilter),
    SetCategoryFilter(Option<AchievementCategory>),
    OpenAchievement(&'static str),
    CloseAchievement,
    // Goals & leaderboard
    SetGoalsTab(GoalsTab),
    SetTimeFilter(TimeFilter),
    // Tree impact
    TogglePreview,
    SelectScenario(usize),
    Share(SharePlatform),
    // Feedback
    Feedback(&'static str, FeedbackValue),
    FeedbackNoteChanged(&'static str, String),
    SubmitFeedbackNote(&'static str),
    /// A click on an instrumented control, followed by what it does.
    Observed(ElementInfo, Box<Message>),
    KeyPressed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GoalsTab {
    #[default]
    Goals,
    Challenges,
}

// ─── APP STATE ─────────────────────────────────────────────────

pub struct ChargeSense {
    route: Route,
    accessibility: AccessibilityStore,
    research: ResearchStore,
    theme: ThemeStore,
    pal: Palette,
    /// Text size multiplier from the large-text setting.
    scale: f32,
    /// Frame time shared by every animated view during one update/view pass.
    clock: Instant,
    rng: StdRng,

    sessions: Vec<ChargingSession>,
    carbon: CarbonData,
    insights: Vec<String>,
    environment: EnvironmentState,
    probe: ChargingProbe,

    progress: UserProgress,
    achievements: Vec<Achievement>,
    goals: Vec<Goal>,
    challenges: Vec<Challenge>,
    leaderboard: Vec<LeaderboardEntry>,

    carbon_tween: Tween,
    fade: PageFade,
    forest: ForestView,
    feedback: HashMap<&'static str, FeedbackWidget>,

    status_filter: StatusFilter,
    category_filter: Option<AchievementCategory>,
    open_achievement: Option<&'static str>,
    goals_tab: GoalsTab,
    time_filter: TimeFilter,
    status_message: Option<String>,
}

impl ChargeSense {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let now = Local::now();
        let clock = Instant::now();
        let mut rng = StdRng::from_entropy();

        let mut accessibility = AccessibilityStore::load(Arc::clone(&storage));
        accessibility.subscribe(|settings| tracing::debug!(?settings, "Accessibility settings changed"));
        let mut research = ResearchStore::load(storage);
        research.subscribe(|prefs| tracing::debug!(?prefs, "Research preferences changed"));

        let sessions = generate_charging_sessions(&mut rng, now);
        let carbon = calculate_carbon_impact(&sessions, now);
        let insights = get_behavior_insights(&sessions, now);
        let environment = get_current_environment(&mut rng, now);
        let mut probe = ChargingProbe::default();
        probe.observe(environment.battery_level, clock);

        tracing::info!(
            sessions = sessions.len(),
            today_g = carbon.today,
            "Generated charging history"
        );

        let theme = ThemeStore::new(now);
        let mut app = Self {
            route: Route::default(),
            pal: build_palette(theme.theme(), accessibility.settings().high_contrast),
            scale: accessibility.flags().text_scale(),
            accessibility,
            research,
            theme,
            clock,
            rng,
            carbon_tween: Tween::new(carbon.today, clock),
            sessions,
            carbon,
            insights,
            environment,
            probe,
            progress: generate_user_progress(),
            achievements: generate_achievements(now),
            goals: generate_goals(now),
            challenges: generate_challenges(now),
            leaderboard: generate_leaderboard(),
            fade: PageFade::new(clock),
            forest: ForestView::new(clock),
            feedback: HashMap::new(),
            status_filter: StatusFilter::All,
            category_filter: None,
            open_achievement: None,
            goals_tab: GoalsTab::default(),
            time_filter: TimeFilter::default(),
            status_message: None,
        };
        app.sync_feedback();
        app.refresh_palette();
        app
    }

    /// Fresh sessions plus everything derived from them.
    fn regenerate_history(&mut self) {
        let now = Local::now();
        self.sessions = generate_charging_sessions(&mut self.rng, now);
        self.carbon = calculate_carbon_impact(&self.sessions, now);
        self.insights = get_behavior_insights(&self.sessions, now);
        tracing::debug!(sessions = self.sessions.len(), today_g = self.carbon.today, "Regenerated charging history");
        self.sync_feedback();
    }

    pub fn title(&self) -> String {
        format!("ChargeSense · {}", self.route.label())
    }

    pub fn theme(&self) -> Theme {
        if self.theme.theme().is_light() { Theme::Light } else { Theme::Dark }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let mut subs: Vec<Subscription<Message>> = active_timers(self.route, self.theme.refresh_interval(), self.is_animating())
            .into_iter()
            .map(|(kind, period)| match kind {
                TimerKind::EnvironmentRefresh => iced::time::every(period).map(|_| Message::EnvironmentTick),
                TimerKind::ChargingProbe => iced::time::every(period).map(|_| Message::ChargingProbeTick),
                TimerKind::ThemeRefresh => iced::time::every(period).map(|_| Message::ThemeTick),
                TimerKind::Animation => iced::time::every(period).map(|_| Message::AnimationTick),
            })
            .collect();

        if self.research.listening() {
            subs.push(keyboard::on_key_press(|key, _modifiers| Some(Message::KeyPressed(key_name(&key)))));
        }
        Subscription::batch(subs)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        self.clock = Instant::now();
        let now = self.clock;

        let task = match message {
            Message::Observed(target, inner) => {
                self.research.handle_global_event(GlobalEvent::Click(Some(target)));
                return self.update(*inner);
            }
            Message::KeyPressed(key) => {
                self.research.handle_global_event(GlobalEvent::KeyDown(key));
                Task::none()
            }
            Message::Navigate(route) => {
                if route != self.route {
                    tracing::debug!(from = self.route.path(), to = route.path(), "Navigate");
                    self.route = route;
                    if matches!(route, Route::Dashboard | Route::Carbon | Route::Charging) {
                        self.regenerate_history();
                    }
                    if matches!(route, Route::Recommendations | Route::Habits) {
                        self.environment = get_current_environment(&mut self.rng, Local::now());
                        self.sync_feedback();
                    }
                    self.fade = PageFade::new(now);
                    self.carbon_tween = Tween::new(self.carbon.today, now);
                    self.forest = ForestView::new(now);
                    self.open_achievement = None;
                    self.status_message = None;
                }
                Task::none()
            }
            Message::EnvironmentTick => {
                self.environment = get_current_environment(&mut self.rng, Local::now());
                self.sync_feedback();
                Task::none()
            }
            Message::ChargingProbeTick => {
                let was_charging = self.probe.is_charging(now);
                self.probe.observe(self.environment.battery_level, now);
                if !was_charging && self.probe.is_charging(now) {
                    tracing::info!(battery = self.environment.battery_level, "Charging detected");
                }
                Task::none()
            }
            Message::ThemeTick => {
                if self.theme.refresh(Local::now()) {
                    tracing::info!(theme = self.theme.theme().name(), "Theme changed with the time of day");
                    self.sync_feedback();
                }
                Task::none()
            }
            Message::AnimationTick => Task::none(),

            Message::SetThemeMode(mode) => {
                self.theme.set_mode(mode, Local::now());
                let mut meta = Metadata::new();
                meta.insert("mode".into(), json!(theme_mode_name(mode)));
                self.research.log_interaction("settings", "theme_mode_changed", Some(meta));
                self.sync_feedback();
                Task::none()
            }
            Message::ToggleAccessibility(key) => {
                let next = !self.accessibility.settings().get(key);
                self.accessibility.update_setting(key, next);
                Task::none()
            }
            Message::ResetAccessibility => {
                self.accessibility.reset_settings();
                Task::none()
            }
            Message::ToggleObservationMode => {
                self.research.toggle_observation_mode(None);
                Task::none()
            }
            Message::ToggleEventLogging => {
                let next = !self.research.event_logging_enabled();
                self.research.set_event_logging_enabled(next);
                Task::none()
            }
            Message::ClearEventLog => {
                self.research.clear_event_log();
                Task::none()
            }

            Message::SetStatusFilter(filter) => {
                self.status_filter = filter;
                Task::none()
            }
            Message::SetCategoryFilter(category) => {
                self.category_filter = category;
                Task::none()
            }
            Message::OpenAchievement(id) => {
                self.open_achievement = Some(id);
                Task::none()
            }
            Message::CloseAchievement => {
                self.open_achievement = None;
                Task::none()
            }
            Message::SetGoalsTab(tab) => {
                self.goals_tab = tab;
                Task::none()
            }
            Message::SetTimeFilter(filter) => {
                self.time_filter = filter;
                Task::none()
            }

            Message::TogglePreview => {
                self.forest.toggle_preview(now);
                Task::none()
            }
            Message::SelectScenario(index) => {
                self.forest.select_scenario(index, now);
                Task::none()
            }
            Message::Share(platform) => {
                self.research
                    .log_interaction("share", &platform.label().to_lowercase(), None);
                match share_url(platform, &self.progress) {
                    Some(url) => {
                        crate::share::open(&url);
                        Task::none()
                    }
                    None => {
                        self.status_message = Some("Copied to clipboard".to_string());
                        iced::clipboard::write(clipboard_text(&self.progress))
                    }
                }
            }

            Message::Feedback(id, value) => {
                if let Some(widget) = self.feedback.get_mut(id) {
                    widget.select(value, &mut self.research);
                }
                Task::none()
            }
            Message::FeedbackNoteChanged(id, note) => {
                if let Some(widget) = self.feedback.get_mut(id) {
                    if widget.note().is_empty() && !note.is_empty() {
                        let target = ElementInfo::new("TEXTAREA").aria_label(format!("Feedback note for {id}"));
                        self.research.handle_global_event(GlobalEvent::Focus(Some(target)));
                    }
                    widget.set_note(note);
                }
                Task::none()
            }
            Message::SubmitFeedbackNote(id) => {
                if let Some(widget) = self.feedback.get_mut(id) {
                    if !widget.submit_note(&mut self.research) {
                        tracing::debug!(entity = id, "Nothing to submit");
                    }
                }
                Task::none()
            }
        };

        self.refresh_palette();
        task
    }

    /// One feedback widget per recommendation currently on screen.
    fn sync_feedback(&mut self) {
        for rec in build_recommendations(self.theme.theme(), &self.sessions, &self.environment) {
            self.feedback
                .entry(rec.id)
                .or_insert_with(|| FeedbackWidget::new(rec.id).with_scope(FEEDBACK_SCOPE));
        }
    }

    fn refresh_palette(&mut self) {
        let flags = self.accessibility.flags();
        let base = build_palette(self.theme.theme(), flags.high_contrast);
        let opacity = self.fade.opacity_at(self.clock, flags.reduce_motion);
        self.pal = faded(base, opacity);
        self.scale = flags.text_scale();
    }

    fn is_animating(&self) -> bool {
        let dm = self.accessibility.disable_motion();
        if dm {
            return false;
        }
        let fading = !self.fade.is_finished(self.clock, dm);
        let counting = matches!(self.route, Route::Dashboard | Route::Carbon)
            && !self.carbon_tween.is_finished(self.clock, dm);
        let felling = self.route == Route::Dashboard && !self.forest.is_settled(self.carbon.today, self.clock, dm);
        fading || counting || felling
    }

    fn sz(&self, px: f32) -> f32 {
        px * self.scale
    }

    fn chart_colors(&self) -> ChartColors {
        let p = &self.pal;
        ChartColors {
            bg: p.card_bg,
            border: p.border,
            grid: Color { a: 0.35, ..p.border },
            label: p.label,
            text: p.card_text,
        }
    }

    fn ring_colors(&self) -> RingColors {
        let p = &self.pal;
        RingColors { bg: p.card_bg, label: p.label, text: p.card_text, track: p.bar_bg }
    }

    /// Chart grow-in follows the page fade.
    fn reveal(&self) -> f32 {
        self.fade.opacity_at(self.clock, self.accessibility.disable_motion())
    }

    /// Annotation badge and persistent outline while observation mode is on.
    fn annotate<'a>(&self, content: Element<'a, Message>, label: String) -> Element<'a, Message> {
        if self.research.presentation_class().is_none() {
            return content;
        }
        let accent = self.pal.accent;
        column![
            text(format!("◉ {label}")).size(self.sz(9.0)).font(iced::Font::MONOSPACE).color(accent),
            container(content).padding(2).style(move |_: &Theme| container::Style {
                border: Border { color: accent, width: 2.0, radius: 10.0.into() },
                ..Default::default()
            }),
        ]
        .spacing(2)
        .into()
    }

    /// Textual stand-in for a chart, shown in screen-reader mode.
    fn describe(&self, description: String) -> Element<'static, Message> {
        if self.accessibility.flags().screen_reader {
            text(description).size(self.sz(11.0)).color(self.pal.label).into()
        } else {
            Space::new(0, 0).into()
        }
    }

    // ─── SHELL ─────────────────────────────────────────────────

    pub fn view(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let theme = self.theme.theme();

        let tabs = Row::with_children(NAV_ITEMS.iter().map(|r| menu_tab(*r, self.route, p, self.scale))).spacing(4);

        let mut badges: Vec<Element<Message>> = Vec::new();
        if self.probe.is_charging(self.clock) {
            badges.push(text("⚡ Charging").size(self.sz(11.0)).color(p.green).into());
        }
        if self.research.observation_mode() {
            badges.push(text("◉ Observation").size(self.sz(11.0)).color(p.accent).into());
        }
        if self.research.event_logging_enabled() {
            badges.push(
                text(format!("● {} events", self.research.event_count()))
                    .size(self.sz(11.0))
                    .font(iced::Font::MONOSPACE)
                    .color(p.red)
                    .into(),
            );
        }
        if let Some(msg) = &self.status_message {
            badges.push(text(msg.clone()).size(self.sz(11.0)).color(p.yellow).into());
        }

        let menu_bar = row![
            text("⚡ ChargeSense").size(self.sz(15.0)).color(p.accent),
            Space::with_width(8),
            text(format!("{} {}", theme.icon(), theme.label())).size(self.sz(11.0)).color(p.label),
            Space::with_width(8),
            Row::with_children(badges).spacing(8).align_y(Alignment::Center),
            Space::with_width(Length::Fill),
            tabs,
            Space::with_width(Length::Fill),
            text(Local::now().format("%H:%M").to_string())
                .size(self.sz(13.0))
                .font(iced::Font::MONOSPACE)
                .color(p.text),
        ]
        .align_y(Alignment::Center)
        .padding([6, 12]);

        let page: Element<Message> = match self.route {
            Route::Dashboard => self.view_dashboard(),
            Route::Achievements => self.view_achievements(),
            Route::Goals => self.view_goals(),
            Route::Leaderboard => self.view_leaderboard(),
            Route::Carbon => self.view_carbon(),
            Route::Settings => self.view_settings(),
            Route::Charging => self.view_charging(),
            Route::Recommendations => self.view_recommendations(),
            Route::Habits => self.view_habits(),
        };

        let offset = self.fade.offset_at(self.clock, self.accessibility.disable_motion());
        let body = scrollable(
            container(page)
                .max_width(760)
                .padding(iced::Padding { top: 12.0 + offset.max(0.0), right: 16.0, bottom: 24.0, left: 16.0 }),
        )
        .height(Length::Fill);

        let main = column![
            panel_bg(menu_bar.into(), p.card_bg, p.border),
            container(body).center_x(Length::Fill),
        ]
        .spacing(0);

        let background = page_background(p.background);
        let base: Element<Message> = container(main)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_: &Theme| container::Style { background: Some(background), ..Default::default() })
            .into();

        match self.open_achievement.and_then(|id| self.achievements.iter().find(|a| a.id == id)) {
            Some(achievement) => stack![base, self.achievement_modal(achievement)].into(),
            None => base,
        }
    }

    // ─── DASHBOARD ─────────────────────────────────────────────

    fn view_dashboard(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let now = Local::now();
        let dm = self.accessibility.disable_motion();
        let theme = self.theme.theme();

        // Carbon impact header
        let shown = self.carbon_tween.value_at(self.clock, dm);
        let level = emission_level(self.carbon.today);
        let ring = Canvas::new(ProgressRing::carbon(
            shown as f32,
            emission_color(self.carbon.today),
            level.label(),
            self.ring_colors(),
            self.scale,
        ))
        .width(Length::Fixed(180.0))
        .height(Length::Fixed(180.0));
        let spark = Canvas::new(Sparkline {
            data: self.carbon.weekly.iter().map(|v| *v as f32).collect(),
            color: p.accent,
        })
        .width(Length::Fill)
        .height(Length::Fixed(28.0));

        let header = panel(
            column![
                text("Your CO₂ impact today").size(self.sz(20.0)).color(p.card_text),
                ring,
                text(format!("Emission Level: {}", level.label()))
                    .size(self.sz(13.0))
                    .color(emission_color(self.carbon.today)),
                self.describe(format!(
                    "Today's emissions are {:.1} grams, which is {}.",
                    self.carbon.today,
                    level.label().to_lowercase()
                )),
                text("This week").size(self.sz(10.0)).color(p.label),
                spark,
            ]
            .spacing(6)
            .align_x(Alignment::Center)
            .into(),
            p,
        );

        let insight = panel(text(get_time_based_insight(theme)).size(self.sz(13.0)).color(p.card_text).into(), p);

        let today_sessions = get_today_sessions(&self.sessions, now);
        let last = today_sessions.first().or_else(|| self.sessions.first());
        let last_session: Element<Message> = match last {
            Some(s) => panel(
                column![
                    card_title("Last Charging Session", p, self.scale),
                    info_row("Start → End", format!("{}% → {}%", s.start_percent, s.end_percent), p, self.scale),
                    info_row("Estimated CO₂", format!("{}g", s.co2_emitted), p, self.scale),
                    info_row("Time Plugged In", format!("{} min", s.duration), p, self.scale),
                    info_row("Charger Type", s.charger_type.label(), p, self.scale),
                ]
                .spacing(6)
                .into(),
                p,
            ),
            None => Space::new(0, 0).into(),
        };

        let insights = panel(
            Column::with_children(
                std::iter::once(card_title("📈 Behaviour Insights", p, self.scale)).chain(
                    self.insights
                        .iter()
                        .map(|i| text(format!("• {i}")).size(self.sz(13.0)).color(p.card_text).into()),
                ),
            )
            .spacing(6)
            .into(),
            p,
        );

        let gamification = row![
            panel(self.streak_card(), p),
            panel(
                column![
                    text("Points").size(self.sz(11.0)).color(p.label),
                    text(format!("⭐ {}", self.progress.points))
                        .size(self.sz(22.0))
                        .font(iced::Font::MONOSPACE)
                        .color(p.yellow),
                ]
                .spacing(4)
                .into(),
                p,
            ),
        ]
        .spacing(12);

        let level_card = panel(
            column![
                row![
                    text(format!("Level {}", self.progress.level)).size(self.sz(15.0)).color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(format!("{} / {} XP", self.progress.xp, self.progress.xp_to_next_level))
                        .size(self.sz(11.0))
                        .font(iced::Font::MONOSPACE)
                        .color(p.label),
                ],
                themed_bar(self.progress.level_progress_percent(), p.purple, p.bar_bg),
                text(self.progress.xp_remaining_text()).size(self.sz(11.0)).color(p.label),
            ]
            .spacing(6)
            .into(),
            p,
        );

        let recent: Vec<Element<Message>> = self
            .achievements
            .iter()
            .filter(|a| a.unlocked)
            .take(RECENT_ACHIEVEMENTS)
            .map(|a| self.achievement_badge(a))
            .collect();
        let recent_card: Element<Message> = if recent.is_empty() {
            Space::new(0, 0).into()
        } else {
            panel(
                column![
                    card_title("🏆 Recent Achievements", p, self.scale),
                    Row::with_children(recent).spacing(10),
                ]
                .spacing(8)
                .into(),
                p,
            )
        };

        let quick_links = row![
            self.link_card("🏆", Route::Achievements),
            self.link_card("🎯", Route::Goals),
            self.link_card("👥", Route::Leaderboard),
        ]
        .spacing(8);

        let ctas = column![
            self.cta_button("View Charging Patterns", Route::Charging),
            self.cta_button("See CO₂ Breakdown", Route::Carbon),
            self.cta_button("Improve My Habits", Route::Recommendations),
            self.cta_button("Review Digital Habits", Route::Habits),
        ]
        .spacing(8);

        column![
            header,
            insight,
            last_session,
            insights,
            self.environment_bar(),
            gamification,
            level_card,
            recent_card,
            panel(self.tree_impact(), p),
            panel(self.share_card(), p),
            quick_links,
            ctas,
        ]
        .spacing(12)
        .into()
    }

    fn streak_card(&self) -> Element<'static, Message> {
        let p = &self.pal;
        let on_fire = is_on_fire(self.progress.current_streak);
        let flame = if on_fire { "🔥" } else { "🕯" };
        column![
            text("Streak").size(self.sz(11.0)).color(p.label),
            text(format!("{flame} {} days", self.progress.current_streak))
                .size(self.sz(22.0))
                .color(if on_fire { p.red } else { p.card_text }),
            text(format!("Best: {} days", self.progress.longest_streak)).size(self.sz(10.0)).color(p.label),
        ]
        .spacing(4)
        .into()
    }

    fn environment_bar(&self) -> Element<'static, Message> {
        let p = &self.pal;
        let env = &self.environment;
        let charging = self.probe.is_charging(self.clock);
        let battery = format!("{}%{}", env.battery_level, if charging { " ⚡" } else { "" });
        panel(
            column![
                row![
                    env_item("📶", env.network_type.label(), p, self.scale),
                    env_item("🚶", env.motion_state.label(), p, self.scale),
                    env_item("💡", env.light_level.label(), p, self.scale),
                    env_item("🔋", &battery, p, self.scale),
                ]
                .spacing(8),
                themed_bar(env.battery_level as f32, battery_color(env.battery_level), p.bar_bg),
            ]
            .spacing(8)
            .into(),
            p,
        )
    }

    fn tree_impact(&self) -> Element<'static, Message> {
        let p = &self.pal;
        let dm = self.accessibility.disable_motion();
        let cut = self.forest.trees_cut_at(self.carbon.today, self.clock, dm) as usize;

        let rows: Vec<Element<Message>> = (0..FOREST_SIZE as usize)
            .collect::<Vec<_>>()
            .chunks(TREES_PER_ROW)
            .map(|chunk| {
                Row::with_children(chunk.iter().map(|i| {
                    let glyph = if *i < cut { "🪵" } else { "🌳" };
                    text(glyph).size(self.sz(22.0)).into()
                }))
                .spacing(10)
                .into()
            })
            .collect();

        let toggle_label = if self.forest.preview.is_some() { "Show live impact" } else { "Preview scenarios" };
        let mut controls: Vec<Element<Message>> = vec![chip(
            toggle_label,
            false,
            Message::TogglePreview,
            ElementInfo::new("BUTTON").observation_label("tree-preview-toggle"),
            p,
            self.scale,
        )];
        if let Some(selected) = self.forest.preview {
            controls.extend(SCENARIOS.iter().enumerate().map(|(i, s)| {
                chip(
                    s.label,
                    selected == i,
                    Message::SelectScenario(i),
                    ElementInfo::new("BUTTON").text(s.label),
                    p,
                    self.scale,
                )
            }));
        }

        let content = column![
            card_title("🌳 Tree Impact", p, self.scale),
            Column::with_children(rows).spacing(4).align_x(Alignment::Center),
            text(self.forest.caption(self.carbon.today, cut as u32)).size(self.sz(12.0)).color(p.label),
            Row::with_children(controls).spacing(6),
        ]
        .spacing(8)
        .align_x(Alignment::Center);
        self.annotate(content.into(), "tree-impact".to_string())
    }

    fn share_card(&self) -> Element<'static, Message> {
        let p = &self.pal;
        let buttons = [SharePlatform::Native, SharePlatform::Twitter, SharePlatform::Facebook].map(|platform| {
            chip(
                platform.label(),
                platform == SharePlatform::Native,
                Message::Share(platform),
                ElementInfo::new("BUTTON").observation_label(format!("share-{}", platform.label().to_lowercase())),
                p,
                self.scale,
            )
        });
        column![
            card_title("Share your progress", p, self.scale),
            text(share_text(&self.progress)).size(self.sz(12.0)).color(p.card_text),
            text(format!("Today: {:.1}g CO₂", self.carbon.today)).size(self.sz(11.0)).color(p.label),
            Row::with_children(buttons).spacing(6),
        ]
        .spacing(8)
        .into()
    }

    fn link_card(&self, icon: &'static str, route: Route) -> Element<'static, Message> {
        let p = &self.pal;
        let card_bg = p.card_bg;
        let border_c = p.border;
        let text_c = p.card_text;
        button(
            column![text(icon).size(self.sz(22.0)), text(route.label()).size(self.sz(11.0)).color(text_c)]
                .align_x(Alignment::Center)
                .spacing(4),
        )
        .on_press(observed(Message::Navigate(route), ElementInfo::new("A").text(route.label())))
        .width(Length::Fill)
        .padding([10, 6])
        .style(move |_: &Theme, status| button::Style {
            background: Some(Background::Color(match status {
                button::Status::Hovered | button::Status::Pressed => lighten(card_bg, 0.05),
                _ => card_bg,
            })),
            text_color: text_c,
            border: Border { color: border_c, width: 1.0, radius: 10.0.into() },
            ..Default::default()
        })
        .into()
    }

    fn cta_button(&self, label: &'static str, route: Route) -> Element<'static, Message> {
        let p = &self.pal;
        let card_bg = p.card_bg;
        let accent = p.accent;
        let text_c = p.card_text;
        button(
            row![
                text(label).size(self.sz(14.0)).color(text_c),
                Space::with_width(Length::Fill),
                text("→").size(self.sz(16.0)).color(accent),
            ]
            .align_y(Alignment::Center),
        )
        .on_press(observed(Message::Navigate(route), ElementInfo::new("A").text(label)))
        .width(Length::Fill)
        .padding([12, 14])
        .style(move |_: &Theme, status| button::Style {
            background: Some(Background::Color(match status {
                button::Status::Hovered | button::Status::Pressed => lighten(card_bg, 0.05),
                _ => card_bg,
            })),
            text_color: text_c,
            border: Border { color: accent, width: 1.0, radius: 12.0.into() },
            ..Default::default()
        })
        .into()
    }

    // ─── CHARGING ──────────────────────────────────────────────

    fn view_charging(&self) -> Element<'_, Message> {
        let p = &self.pal;

        let timeline: Vec<Datum> = self
            .sessions
            .iter()
            .take(TIMELINE_SESSIONS)
            .enumerate()
            .map(|(i, s)| Datum::new(format!("S{}", i + 1), s.start_percent as f32, charging_start_color(s.start_percent)))
            .collect();
        let timeline_desc = timeline
            .iter()
            .map(|d| format!("{} {:.0}%", d.label, d.value))
            .collect::<Vec<_>>()
            .join(", ");
        let line = Canvas::new(CategoryChart {
            kind: ChartKind::Line { line_color: p.green },
            data: timeline,
            y_max: 100.0,
            title: "Charge Start % Over Time".to_string(),
            unit: "%".to_string(),
            colors: self.chart_colors(),
            reveal: self.reveal(),
            text_scale: self.scale,
        })
        .width(Length::Fill)
        .height(Length::Fixed(200.0));

        let distribution: Vec<Datum> = start_percent_distribution(&self.sessions)
            .iter()
            .map(|(bucket, count)| Datum::new(bucket.label(), *count as f32, p.green))
            .collect();
        let dist_desc = distribution
            .iter()
            .map(|d| format!("{}: {:.0}", d.label, d.value))
            .collect::<Vec<_>>()
            .join(", ");
        let bars = Canvas::new(CategoryChart {
            kind: ChartKind::Bars,
            y_max: axis_max(distribution.iter().map(|d| d.value), 5.0),
            data: distribution,
            title: "Start % Distribution".to_string(),
            unit: " sessions".to_string(),
            colors: self.chart_colors(),
            reveal: self.reveal(),
            text_scale: self.scale,
        })
        .width(Length::Fill)
        .height(Length::Fixed(200.0));

        let flags = behaviour_flags(&self.sessions);
        let mut badges: Vec<Element<Message>> = Vec::new();
        if flags.battery_anxiety {
            badges.push(behaviour_badge("⚠️ Battery Anxiety", p.red, self.scale));
        }
        if flags.fast_charge_heavy {
            badges.push(behaviour_badge("🌀 Fast-charge Heavy", p.blue, self.scale));
        }
        if flags.eco_charging {
            badges.push(behaviour_badge("🌿 Eco Charging", p.green, self.scale));
        }
        if flags.partial_charging {
            badges.push(behaviour_badge("🔌 Partial Charging", p.blue, self.scale));
        }
        let note: Element<Message> = if flags.battery_anxiety {
            text("Your battery anxiety pattern increases carbon emissions. Try charging earlier.")
                .size(self.sz(12.0))
                .color(p.red)
                .into()
        } else if flags.partial_charging {
            text("Partial charging detected, good for battery health!").size(self.sz(12.0)).color(p.blue).into()
        } else {
            Space::new(0, 0).into()
        };

        let sessions = Column::with_children(self.sessions.iter().take(TIMELINE_SESSIONS).map(|s| {
            let bar_bg = p.bar_bg;
            container(
                column![
                    row![
                        text(s.start_time.format("%b %-d, %H:%M").to_string())
                            .size(self.sz(12.0))
                            .color(p.card_text),
                        Space::with_width(Length::Fill),
                        text(s.charger_type.label()).size(self.sz(10.0)).color(p.label),
                    ],
                    row![
                        text(format!("🔋 Start {}% → End {}%", s.start_percent, s.end_percent))
                            .size(self.sz(11.0))
                            .color(charging_start_color(s.start_percent)),
                        Space::with_width(Length::Fill),
                        text(format!("⏱ {} min", s.duration)).size(self.sz(11.0)).color(p.label),
                        Space::with_width(12),
                        text(format!("{}g CO₂", s.co2_emitted))
                            .size(self.sz(11.0))
                            .font(iced::Font::MONOSPACE)
                            .color(emission_color(s.co2_emitted)),
                    ],
                ]
                .spacing(4),
            )
            .padding([8, 10])
            .style(move |_: &Theme| container::Style {
                background: Some(Background::Color(Color { a: 0.5, ..bar_bg })),
                border: Border { radius: 8.0.into(), ..Default::default() },
                ..Default::default()
            })
            .into()
        }))
        .spacing(6);

        column![
            page_title("Charging Behaviour", p, self.scale),
            panel(column![line, self.describe(format!("Start percentages: {timeline_desc}."))].spacing(4).into(), p),
            panel(column![bars, self.describe(format!("Sessions by start level: {dist_desc}."))].spacing(4).into(), p),
            panel(
                column![card_title("Behaviour Patterns", p, self.scale), Row::with_children(badges).spacing(6), note]
                    .spacing(8)
                    .into(),
                p,
            ),
            panel(column![card_title("Recent Sessions", p, self.scale), sessions].spacing(8).into(), p),
        ]
        .spacing(12)
        .into()
    }

    // ─── CARBON ────────────────────────────────────────────────

    fn view_carbon(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let now = Local::now();
        let dm = self.accessibility.disable_motion();
        let today = self.carbon.today;
        let level = emission_level(today);

        let ring = Canvas::new(ProgressRing::carbon(
            self.carbon_tween.value_at(self.clock, dm) as f32,
            emission_color(today),
            level.label(),
            self.ring_colors(),
            self.scale,
        ))
        .width(Length::Fixed(160.0))
        .height(Length::Fixed(160.0));

        let weekly: Vec<Datum> = self
            .carbon
            .weekly
            .iter()
            .enumerate()
            .map(|(k, v)| {
                let day = now - chrono::Duration::days(6 - k as i64);
                Datum::new(day.format("%a").to_string(), *v as f32, emission_color(*v))
            })
            .collect();
        let weekly_desc = weekly
            .iter()
            .map(|d| format!("{} {:.1}g", d.label, d.value))
            .collect::<Vec<_>>()
            .join(", ");
        let chart = Canvas::new(CategoryChart {
            kind: ChartKind::Bars,
            y_max: axis_max(weekly.iter().map(|d| d.value), 10.0),
            data: weekly,
            title: "Weekly CO₂ Emissions".to_string(),
            unit: "g".to_string(),
            colors: self.chart_colors(),
            reveal: self.reveal(),
            text_scale: self.scale,
        })
        .width(Length::Fill)
        .height(Length::Fixed(200.0));

        let average = self.carbon.weekly.iter().sum::<f64>() / self.carbon.weekly.len() as f64;
        let above = today > average;
        let comparison = panel(
            column![
                card_title("You vs Average", p, self.scale),
                row![
                    column![
                        text("Today's Emission").size(self.sz(11.0)).color(p.label),
                        text(format!("{today:.1}g")).size(self.sz(22.0)).color(emission_color(today)),
                    ]
                    .spacing(2),
                    Space::with_width(Length::Fill),
                    text(if above { "▲" } else { "▼" })
                        .size(self.sz(22.0))
                        .color(if above { p.red } else { p.green }),
                    Space::with_width(Length::Fill),
                    column![
                        text("Weekly Average").size(self.sz(11.0)).color(p.label),
                        text(format!("{average:.1}g")).size(self.sz(22.0)).color(p.card_text),
                    ]
                    .spacing(2)
                    .align_x(Alignment::End),
                ]
                .align_y(Alignment::Center),
                text(format!(
                    "You are {:.1}g {} average",
                    (today - average).abs(),
                    if above { "above" } else { "below" }
                ))
                .size(self.sz(11.0))
                .color(p.label),
            ]
            .spacing(8)
            .into(),
            p,
        );

        let colors = [p.green, p.yellow, p.blue, p.red];
        let entries = self.carbon.breakdown.entries();
        let max = entries.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
        let breakdown = Column::with_children(entries.iter().zip(colors).map(|((name, value), color)| {
            let pct = if max > 0.0 { (value / max * 100.0) as f32 } else { 0.0 };
            column![
                row![
                    text("●").size(self.sz(12.0)).color(color),
                    text(*name).size(self.sz(12.0)).color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(format!("{value:.1}g")).size(self.sz(12.0)).font(iced::Font::MONOSPACE).color(p.card_text),
                ]
                .spacing(6),
                themed_bar(pct, color, p.bar_bg),
            ]
            .spacing(4)
            .into()
        }))
        .spacing(8);

        column![
            page_title("Carbon Impact", p, self.scale),
            panel(column![ring, text(format!("Emission Level: {}", level.label())).size(self.sz(12.0)).color(emission_color(today))].spacing(4).align_x(Alignment::Center).into(), p),
            panel(column![chart, self.describe(format!("Daily emissions for the last seven days: {weekly_desc}."))].spacing(4).into(), p),
            comparison,
            panel(column![card_title("What caused today's emissions?", p, self.scale), breakdown].spacing(8).into(), p),
        ]
        .spacing(12)
        .into()
    }

    // ─── ACHIEVEMENTS ──────────────────────────────────────────

    fn view_achievements(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let unlocked = self.achievements.iter().filter(|a| a.unlocked).count();
        let total = self.achievements.len();

        let summary = panel(
            column![
                text(format!("{unlocked}/{total}")).size(self.sz(32.0)).color(p.green),
                text("Achievements Unlocked").size(self.sz(12.0)).color(p.label),
                themed_bar(
                    if total == 0 { 0.0 } else { unlocked as f32 / total as f32 * 100.0 },
                    p.green,
                    p.bar_bg,
                ),
            ]
            .spacing(6)
            .align_x(Alignment::Center)
            .into(),
            p,
        );

        let status_chips = Row::with_children(StatusFilter::ALL.iter().map(|f| {
            chip(
                f.label(),
                *f == self.status_filter,
                Message::SetStatusFilter(*f),
                ElementInfo::new("BUTTON").observation_label(format!("status-filter-{}", f.label().to_lowercase())),
                p,
                self.scale,
            )
        }))
        .spacing(6);
        let category_chips = Row::with_children(
            std::iter::once(chip(
                "All",
                self.category_filter.is_none(),
                Message::SetCategoryFilter(None),
                ElementInfo::new("BUTTON").observation_label("category-filter-all"),
                p,
                self.scale,
            ))
            .chain(AchievementCategory::ALL.iter().map(|c| {
                chip(
                    c.label(),
                    self.category_filter == Some(*c),
                    Message::SetCategoryFilter(Some(*c)),
                    ElementInfo::new("BUTTON").observation_label(format!("category-filter-{}", c.label().to_lowercase())),
                    p,
                    self.scale,
                )
            })),
        )
        .spacing(6)
        .wrap();

        let filters = panel(
            column![
                text("Status").size(self.sz(11.0)).color(p.label),
                status_chips,
                text("Category").size(self.sz(11.0)).color(p.label),
                category_chips,
            ]
            .spacing(6)
            .into(),
            p,
        );

        let scoring = panel(
            Column::with_children(
                std::iter::once(card_title("How Points Work", p, self.scale))
                    .chain(points_table().into_iter().map(|(label, pts)| info_row(label, format!("+{pts}"), p, self.scale)))
                    .chain(std::iter::once(
                        text(
                            level_roadmap(0, LEVEL_ROADMAP_STEPS)
                                .iter()
                                .map(|(level, xp)| format!("Lv {level}: {xp} XP"))
                                .collect::<Vec<_>>()
                                .join(" · "),
                        )
                        .size(self.sz(11.0))
                        .font(iced::Font::MONOSPACE)
                        .color(p.label)
                        .into(),
                    )),
            )
            .spacing(6)
            .into(),
            p,
        );

        let visible = filter_achievements(&self.achievements, self.status_filter, self.category_filter);
        let grid: Element<Message> = if visible.is_empty() {
            text("No achievements match these filters.").size(self.sz(12.0)).color(p.label).into()
        } else {
            Column::with_children(visible.chunks(2).map(|pair| {
                Row::with_children(pair.iter().map(|a| self.achievement_card(a))).spacing(10).into()
            }))
            .spacing(10)
            .into()
        };

        column![
            page_title("🏆 Achievements", p, self.scale),
            summary,
            filters,
            panel(column![card_title("All Achievements", p, self.scale), grid].spacing(8).into(), p),
            scoring,
        ]
        .spacing(12)
        .into()
    }

    fn achievement_badge(&self, a: &Achievement) -> Element<'static, Message> {
        column![
            text(a.icon).size(self.sz(26.0)),
            text(a.name).size(self.sz(10.0)).color(a.rarity.color()),
        ]
        .align_x(Alignment::Center)
        .spacing(2)
        .width(Length::Fill)
        .into()
    }

    fn achievement_card(&self, a: &Achievement) -> Element<'static, Message> {
        let p = &self.pal;
        let rarity = a.rarity.color();
        let card_bg = p.card_bg;
        let text_c = p.card_text;
        let dim = if a.unlocked { 1.0 } else { 0.55 };

        let mut body = column![
            row![
                text(a.icon).size(self.sz(24.0)),
                Space::with_width(Length::Fill),
                text(a.rarity.label()).size(self.sz(10.0)).color(rarity),
            ]
            .align_y(Alignment::Center),
            text(a.name).size(self.sz(13.0)).color(Color { a: dim, ..text_c }),
            text(a.description).size(self.sz(11.0)).color(p.label),
            text(format!("+{} pts", a.points)).size(self.sz(10.0)).color(p.yellow),
        ]
        .spacing(4);
        if !a.unlocked {
            body = body.push(themed_bar(a.progress as f32, rarity, p.bar_bg)).push(
                text(format!("{}% complete", a.progress)).size(self.sz(10.0)).color(p.label),
            );
        }

        button(body)
            .on_press(observed(
                Message::OpenAchievement(a.id),
                ElementInfo::new("BUTTON").observation_label(format!("achievement-{}", a.id)),
            ))
            .width(Length::FillPortion(1))
            .padding(10)
            .style(move |_: &Theme, status| button::Style {
                background: Some(Background::Color(match status {
                    button::Status::Hovered => lighten(card_bg, 0.04),
                    _ => card_bg,
                })),
                text_color: text_c,
                border: Border { color: Color { a: 0.6 * dim, ..rarity }, width: 1.5, radius: 12.0.into() },
                shadow: Shadow {
                    color: Color { a: 0.15, ..Color::BLACK },
                    offset: Vector::new(0.0, 2.0),
                    blur_radius: 6.0,
                },
            })
            .into()
    }

    fn achievement_modal(&self, a: &Achievement) -> Element<'static, Message> {
        let p = &self.pal;
        let status: Element<Message> = match (a.unlocked, a.unlocked_date) {
            (true, Some(date)) => text(format!("Unlocked {}", format_date(date))).size(self.sz(12.0)).color(p.green).into(),
            (true, None) => text("Unlocked").size(self.sz(12.0)).color(p.green).into(),
            (false, _) => column![
                themed_bar(a.progress as f32, a.rarity.color(), p.bar_bg),
                text(format!("{}% of {}", a.progress, a.target)).size(self.sz(11.0)).color(p.label),
            ]
            .spacing(4)
            .into(),
        };

        let card = panel(
            column![
                text(a.icon).size(self.sz(48.0)),
                text(a.name).size(self.sz(18.0)).color(p.card_text),
                text(format!("{} · {}", a.rarity.label(), a.category.label()))
                    .size(self.sz(11.0))
                    .color(a.rarity.color()),
                text(a.description).size(self.sz(12.0)).color(p.label),
                text(format!("+{} points", a.points)).size(self.sz(12.0)).color(p.yellow),
                status,
                chip(
                    "Close",
                    false,
                    Message::CloseAchievement,
                    ElementInfo::new("BUTTON").aria_label("Close achievement details"),
                    p,
                    self.scale,
                ),
            ]
            .spacing(8)
            .align_x(Alignment::Center)
            .into(),
            p,
        );

        opaque(
            mouse_area(
                center(opaque(container(card).max_width(360))).style(|_: &Theme| container::Style {
                    background: Some(Background::Color(Color { a: 0.6, ..Color::BLACK })),
                    ..Default::default()
                }),
            )
            .on_press(observed(
                Message::CloseAchievement,
                ElementInfo::new("DIV").observation_label("achievement-modal-backdrop"),
            )),
        )
    }

    // ─── GOALS ─────────────────────────────────────────────────

    fn view_goals(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let now = Local::now();

        let tabs = row![
            chip(
                "Goals",
                self.goals_tab == GoalsTab::Goals,
                Message::SetGoalsTab(GoalsTab::Goals),
                ElementInfo::new("BUTTON").observation_label("goals-tab-goals"),
                p,
                self.scale,
            ),
            chip(
                "Challenges",
                self.goals_tab == GoalsTab::Challenges,
                Message::SetGoalsTab(GoalsTab::Challenges),
                ElementInfo::new("BUTTON").observation_label("goals-tab-challenges"),
                p,
                self.scale,
            ),
        ]
        .spacing(6);

        let lists: Element<Message> = match self.goals_tab {
            GoalsTab::Goals => {
                let (active, completed) = partition_goals(&self.goals, now);
                column![
                    self.section("🎯 Active Goals", active.iter().map(|g| self.goal_card(g)).collect()),
                    self.section("Completed Goals", completed.iter().map(|g| self.goal_card(g)).collect()),
                ]
                .spacing(12)
                .into()
            }
            GoalsTab::Challenges => {
                let (active, completed) = partition_challenges(&self.challenges, now);
                column![
                    self.section(
                        "🏆 Active Challenges",
                        active.iter().map(|c| self.challenge_card(c, now)).collect()
                    ),
                    self.section(
                        "Completed Challenges",
                        completed.iter().map(|c| self.challenge_card(c, now)).collect()
                    ),
                ]
                .spacing(12)
                .into()
            }
        };

        column![page_title("🎯 Goals & Challenges", p, self.scale), tabs, lists].spacing(12).into()
    }

    fn section(&self, title: &'static str, cards: Vec<Element<'static, Message>>) -> Element<'static, Message> {
        let p = &self.pal;
        if cards.is_empty() {
            return Space::new(0, 0).into();
        }
        column![card_title(title, p, self.scale), Column::with_children(cards).spacing(8)].spacing(8).into()
    }

    fn goal_card(&self, g: &Goal) -> Element<'static, Message> {
        let p = &self.pal;
        let color = if g.completed { p.green } else { p.blue };
        let reward = match g.reward.badge {
            Some(badge) => format!("🎁 {} pts + {badge}", g.reward.points),
            None => format!("🎁 {} pts", g.reward.points),
        };
        panel(
            column![
                row![
                    text(g.title).size(self.sz(14.0)).color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(g.period.label()).size(self.sz(10.0)).color(color),
                ],
                text(g.description).size(self.sz(11.0)).color(p.label),
                themed_bar(g.progress as f32, color, p.bar_bg),
                row![
                    text(format!("{}g / {}g", g.current, g.target))
                        .size(self.sz(11.0))
                        .font(iced::Font::MONOSPACE)
                        .color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(format!("Due {}", format_date(g.deadline))).size(self.sz(10.0)).color(p.label),
                ],
                text(reward).size(self.sz(11.0)).color(p.yellow),
            ]
            .spacing(6)
            .into(),
            p,
        )
    }

    fn challenge_card(&self, c: &Challenge, now: DateTime<Local>) -> Element<'static, Message> {
        let p = &self.pal;
        let when = if c.is_active(now) {
            format!("{} days left", c.days_left(now))
        } else {
            format!("Ended {}", format_date(c.end_date))
        };
        let reward = match c.reward.badge {
            Some(badge) => format!("🎁 {} pts + {badge}", c.reward.points),
            None => format!("🎁 {} pts", c.reward.points),
        };
        panel(
            column![
                row![
                    text(c.title).size(self.sz(14.0)).color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(format!("{} days", c.duration)).size(self.sz(10.0)).color(p.purple),
                ],
                text(c.description).size(self.sz(11.0)).color(p.label),
                text(format!("Target: {}", c.target)).size(self.sz(11.0)).color(p.card_text),
                themed_bar(c.progress as f32, p.purple, p.bar_bg),
                row![
                    text(format!("{}%", c.progress)).size(self.sz(11.0)).font(iced::Font::MONOSPACE).color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(when).size(self.sz(10.0)).color(p.label),
                ],
                text(reward).size(self.sz(11.0)).color(p.yellow),
            ]
            .spacing(6)
            .into(),
            p,
        )
    }

    // ─── LEADERBOARD ───────────────────────────────────────────

    fn view_leaderboard(&self) -> Element<'_, Message> {
        let p = &self.pal;

        let podium: Element<Message> = match self.leaderboard.as_slice() {
            [first, second, third, ..] => panel(
                column![
                    card_title("Top 3", p, self.scale),
                    row![
                        self.podium_place(second, "2", 60.0),
                        self.podium_place(first, "🏆", 90.0),
                        self.podium_place(third, "3", 45.0),
                    ]
                    .spacing(10)
                    .align_y(Alignment::End),
                ]
                .spacing(8)
                .align_x(Alignment::Center)
                .into(),
                p,
            ),
            _ => Space::new(0, 0).into(),
        };

        let you: Element<Message> = match self.leaderboard.iter().find(|e| e.is_current_user) {
            Some(me) => panel(
                row![
                    column![
                        text("Your Rank").size(self.sz(11.0)).color(p.label),
                        text(format!("#{} of {}", me.rank, self.leaderboard.len()))
                            .size(self.sz(24.0))
                            .color(p.green),
                    ]
                    .spacing(2),
                    Space::with_width(Length::Fill),
                    column![
                        text(format!("{}", me.points)).size(self.sz(20.0)).color(p.yellow),
                        text("points").size(self.sz(10.0)).color(p.label),
                    ]
                    .align_x(Alignment::End),
                ]
                .align_y(Alignment::Center)
                .into(),
                p,
            ),
            None => Space::new(0, 0).into(),
        };

        let filters = Row::with_children(TimeFilter::ALL.iter().map(|f| {
            chip(
                f.label(),
                *f == self.time_filter,
                Message::SetTimeFilter(*f),
                ElementInfo::new("BUTTON").observation_label(format!("time-filter-{}", f.label().to_lowercase())),
                p,
                self.scale,
            )
        }))
        .spacing(6);

        let rows = Column::with_children(self.leaderboard.iter().map(|e| self.leaderboard_row(e))).spacing(4);

        column![
            page_title("🏆 Leaderboard", p, self.scale),
            podium,
            you,
            panel(
                column![
                    row![card_title("Rankings", p, self.scale), Space::with_width(Length::Fill), filters]
                        .align_y(Alignment::Center),
                    rows,
                ]
                .spacing(8)
                .into(),
                p,
            ),
        ]
        .spacing(12)
        .into()
    }

    fn podium_place(&self, e: &LeaderboardEntry, marker: &'static str, height: f32) -> Element<'static, Message> {
        let p = &self.pal;
        let bar_bg = p.bar_bg;
        column![
            text(e.avatar).size(self.sz(28.0)),
            text(e.username).size(self.sz(11.0)).color(p.card_text),
            text(format!("{} pts", e.points)).size(self.sz(10.0)).color(p.label),
            container(text(marker).size(self.sz(18.0)).color(p.card_text))
                .center_x(Length::Fixed(70.0))
                .height(Length::Fixed(height))
                .padding(6)
                .style(move |_: &Theme| container::Style {
                    background: Some(Background::Color(bar_bg)),
                    border: Border { radius: 6.0.into(), ..Default::default() },
                    ..Default::default()
                }),
        ]
        .spacing(4)
        .align_x(Alignment::Center)
        .into()
    }

    fn leaderboard_row(&self, e: &LeaderboardEntry) -> Element<'static, Message> {
        let p = &self.pal;
        let highlight = if e.is_current_user { Color { a: 0.15, ..p.green } } else { Color::TRANSPARENT };
        let border_c = if e.is_current_user { p.green } else { Color::TRANSPARENT };
        container(
            row![
                text(format!("{:>2}", e.rank)).size(self.sz(13.0)).font(iced::Font::MONOSPACE).color(p.label).width(28),
                text(e.avatar).size(self.sz(18.0)),
                column![
                    text(if e.is_current_user { format!("{} (You)", e.username) } else { e.username.to_string() })
                        .size(self.sz(13.0))
                        .color(p.card_text),
                    text(format!("Lv.{} · 🌿 {}g · 🔥 {}", e.level, e.carbon_reduced, e.streak))
                        .size(self.sz(10.0))
                        .color(p.label),
                ]
                .spacing(2),
                Space::with_width(Length::Fill),
                text(format!("{}", e.points)).size(self.sz(13.0)).font(iced::Font::MONOSPACE).color(p.yellow),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        )
        .padding([6, 8])
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(highlight)),
            border: Border { color: border_c, width: 1.0, radius: 8.0.into() },
            ..Default::default()
        })
        .into()
    }

    // ─── RECOMMENDATIONS ───────────────────────────────────────

    fn view_recommendations(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let theme = self.theme.theme();
        let in_motion = is_in_motion(&self.environment);
        let recs = build_recommendations(theme, &self.sessions, &self.environment);

        let header = panel(
            column![
                text(format!("{} {}", theme.icon(), theme.label())).size(self.sz(15.0)).color(p.card_text),
                text(theme_summary(theme)).size(self.sz(12.0)).color(p.label),
            ]
            .spacing(4)
            .into(),
            p,
        );

        let motion_note: Element<Message> = if in_motion {
            text(format!("🚶 You're {}. Showing shorter tips.", self.environment.motion_state.label().to_lowercase()))
                .size(self.sz(11.0))
                .color(p.yellow)
                .into()
        } else {
            Space::new(0, 0).into()
        };

        let cards = Column::with_children(recs.iter().map(|rec| {
            let feedback: Element<Message> = match self.feedback.get(rec.id) {
                Some(widget) => self.feedback_widget(rec.id, widget),
                None => Space::new(0, 0).into(),
            };
            let card = panel(
                column![
                    row![
                        text(rec.icon).size(self.sz(22.0)),
                        column![
                            row![
                                text(rec.title).size(self.sz(14.0)).color(p.card_text),
                                Space::with_width(Length::Fill),
                                text(rec.priority.label()).size(self.sz(10.0)).color(rec.priority.color()),
                            ],
                            text(rec.display_description(in_motion)).size(self.sz(12.0)).color(p.label),
                        ]
                        .spacing(4),
                    ]
                    .spacing(10),
                    feedback,
                ]
                .spacing(8)
                .into(),
                p,
            );
            self.annotate(card, rec.observation_label())
        }))
        .spacing(10);

        let tips = panel(
            Column::with_children(
                std::iter::once(card_title("💡 Quick Tips", p, self.scale)).chain(
                    QUICK_TIPS.iter().map(|t| text(format!("• {t}")).size(self.sz(12.0)).color(p.card_text).into()),
                ),
            )
            .spacing(6)
            .into(),
            p,
        );

        column![
            page_title("Recommendations", p, self.scale),
            header,
            motion_note,
            cards,
            tips,
            self.cta_button("📱 Review Digital Habits", Route::Habits),
        ]
        .spacing(12)
        .into()
    }

    fn feedback_widget(&self, id: &'static str, widget: &FeedbackWidget) -> Element<'static, Message> {
        let p = &self.pal;
        let options = [(FeedbackValue::Useful, "👍 Useful"), (FeedbackValue::NotUseful, "👎 Not useful")].map(
            |(value, label)| {
                chip(
                    label,
                    widget.selection() == Some(value),
                    Message::Feedback(id, value),
                    ElementInfo::new("BUTTON").observation_label(widget.button_label(value)),
                    p,
                    self.scale,
                )
            },
        );

        let mut body = column![
            text(widget.question().to_string()).size(self.sz(11.0)).color(p.label),
            Row::with_children(options).spacing(6),
        ]
        .spacing(6);

        if let Some(selection) = widget.selection() {
            body = body.push(text(selection.acknowledgement()).size(self.sz(11.0)).color(p.green));
            if widget.note_saved() {
                body = body.push(text("Thanks for the note!").size(self.sz(11.0)).color(p.label));
            } else {
                let submit = button(text("Send").size(self.sz(11.0)))
                    .on_press_maybe(widget.can_submit().then(|| {
                        observed(
                            Message::SubmitFeedbackNote(id),
                            ElementInfo::new("BUTTON").aria_label(format!("Submit feedback note for {id}")),
                        )
                    }))
                    .padding([4, 10]);
                body = body.push(
                    row![
                        text_input("Tell us more (optional)", widget.note())
                            .on_input(move |note| Message::FeedbackNoteChanged(id, note))
                            .on_submit(Message::SubmitFeedbackNote(id))
                            .size(self.sz(12.0))
                            .padding(6),
                        submit,
                    ]
                    .spacing(6)
                    .align_y(Alignment::Center),
                );
            }
        }

        self.annotate(body.into(), widget.container_label())
    }

    // ─── HABITS ────────────────────────────────────────────────

    fn view_habits(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let env = &self.environment;
        let in_motion = is_in_motion(env);
        let usage = get_app_usage();

        let warning: Element<Message> = if shows_mobile_data_warning(env) {
            let card = panel(text(MOBILE_DATA_WARNING).size(self.sz(13.0)).color(p.yellow).into(), p);
            self.annotate(card, "mobile-data-warning".to_string())
        } else {
            Space::new(0, 0).into()
        };

        let usage_view: Element<Message> = if in_motion {
            Column::with_children(top_apps(&usage).into_iter().map(|u| {
                row![
                    text(u.app_name.clone()).size(self.sz(12.0)).color(p.card_text),
                    Space::with_width(Length::Fill),
                    text(format!("{} min", u.duration)).size(self.sz(12.0)).color(p.label),
                ]
                .into()
            }))
            .spacing(6)
            .into()
        } else {
            let data = app_usage_data(&usage, p);
            let desc = data
                .iter()
                .map(|d| format!("{} {:.0} min", d.label, d.value))
                .collect::<Vec<_>>()
                .join(", ");
            column![
                Canvas::new(CategoryChart {
                    kind: ChartKind::Bars,
                    y_max: axis_max(data.iter().map(|d| d.value), 30.0),
                    data,
                    title: "Minutes per App".to_string(),
                    unit: " min".to_string(),
                    colors: self.chart_colors(),
                    reveal: self.reveal(),
                    text_scale: self.scale,
                })
                .width(Length::Fill)
                .height(Length::Fixed(200.0)),
                self.describe(format!("App usage: {desc}.")),
            ]
            .spacing(4)
            .into()
        };

        let motion = motion_pattern(p);
        let motion_desc = pattern_summary(&motion);
        let network = network_pattern(p);
        let network_desc = pattern_summary(&network);
        let share_chart = |data: Vec<Datum>, title: &str| -> Canvas<CategoryChart, Message> {
            Canvas::new(CategoryChart {
                kind: ChartKind::Bars,
                y_max: 100.0,
                data,
                title: title.to_string(),
                unit: "%".to_string(),
                colors: self.chart_colors(),
                reveal: self.reveal(),
                text_scale: self.scale,
            })
            .width(Length::Fill)
            .height(Length::Fixed(180.0))
        };

        let details: Element<Message> = if shows_usage_details(env) {
            panel(
                Column::with_children(std::iter::once(card_title("App Usage Details", p, self.scale)).chain(
                    usage.iter().map(|u| {
                        row![
                            column![
                                text(u.app_name.clone()).size(self.sz(12.0)).color(p.card_text),
                                text(u.category.clone()).size(self.sz(10.0)).color(p.label),
                            ]
                            .spacing(2),
                            Space::with_width(Length::Fill),
                            text(format!("{} min", u.duration))
                                .size(self.sz(11.0))
                                .font(iced::Font::MONOSPACE)
                                .color(p.label),
                        ]
                        .align_y(Alignment::Center)
                        .into()
                    }),
                ))
                .spacing(8)
                .into(),
                p,
            )
        } else {
            Space::new(0, 0).into()
        };

        column![
            page_title("📱 Digital Habits", p, self.scale),
            warning,
            panel(column![card_title("Top Apps Usage", p, self.scale), usage_view].spacing(8).into(), p),
            panel(
                column![
                    card_title("Motion Patterns", p, self.scale),
                    share_chart(motion, "Share of Day"),
                    self.describe(format!("Motion: {motion_desc}.")),
                ]
                .spacing(8)
                .into(),
                p,
            ),
            panel(
                column![
                    card_title("Network Usage", p, self.scale),
                    share_chart(network, "Share of Traffic"),
                    self.describe(format!("Network: {network_desc}.")),
                    text(format!("Current: {}", env.network_type.label())).size(self.sz(12.0)).color(p.label),
                ]
                .spacing(8)
                .into(),
                p,
            ),
            details,
        ]
        .spacing(12)
        .into()
    }

    // ─── SETTINGS ──────────────────────────────────────────────

    fn view_settings(&self) -> Element<'_, Message> {
        let p = &self.pal;
        let mode = self.theme.mode();

        let mut theme_options: Vec<Element<Message>> = vec![self.option_row("🕒", "Auto", ThemeMode::Auto, mode)];
        theme_options.extend(
            ThemeName::ALL
                .iter()
                .map(|t| self.option_row(t.icon(), t.label(), ThemeMode::Fixed(*t), mode)),
        );
        let theme_card = panel(
            column![
                card_title("🎨 Theme Settings", p, self.scale),
                text(format!("Current Theme: {}", self.theme.theme().label()))
                    .size(self.sz(12.0))
                    .color(p.card_text),
                if mode.is_auto() {
                    text("Theme changes automatically based on time of day").size(self.sz(10.0)).color(p.label)
                } else {
                    text("").size(self.sz(10.0))
                },
                Column::with_children(theme_options).spacing(6),
            ]
            .spacing(6)
            .into(),
            p,
        );

        let settings = self.accessibility.settings();
        let a11y_rows = SettingKey::ALL.iter().map(|key| {
            toggle_row(
                key.label(),
                key.description(),
                settings.get(*key),
                Message::ToggleAccessibility(*key),
                ElementInfo::new("BUTTON").aria_label(key.label()),
                p,
                self.scale,
            )
        });
        let active = self.accessibility.flags().class_names().join(" ");
        let a11y_card = panel(
            Column::with_children(
                std::iter::once(card_title("♿ Accessibility", p, self.scale))
                    .chain(a11y_rows)
                    .chain([
                        text(if active.is_empty() { "No adjustments active".to_string() } else { format!("Active: {active}") })
                            .size(self.sz(10.0))
                            .font(iced::Font::MONOSPACE)
                            .color(p.label)
                            .into(),
                        chip(
                            "Reset to defaults",
                            false,
                            Message::ResetAccessibility,
                            ElementInfo::new("BUTTON").text("Reset to defaults"),
                            p,
                            self.scale,
                        ),
                    ]),
            )
            .spacing(8)
            .into(),
            p,
        );

        let research_card = panel(
            column![
                card_title("🔬 Research Mode", p, self.scale),
                toggle_row(
                    "Observation mode",
                    "Show annotation badges and outlines on instrumented elements",
                    self.research.observation_mode(),
                    Message::ToggleObservationMode,
                    ElementInfo::new("BUTTON").observation_label("observation-mode-toggle"),
                    p,
                    self.scale,
                ),
                toggle_row(
                    "Event logging",
                    "Record clicks, focus and key presses in the session log",
                    self.research.event_logging_enabled(),
                    Message::ToggleEventLogging,
                    ElementInfo::new("BUTTON").observation_label("event-logging-toggle"),
                    p,
                    self.scale,
                ),
                self.event_log(),
            ]
            .spacing(8)
            .into(),
            p,
        );

        let about = panel(
            column![
                card_title("About ChargeSense", p, self.scale),
                text(
                    "A behaviour-adaptive carbon-impact assistant that helps you reduce your footprint through better charging habits."
                )
                .size(self.sz(12.0))
                .color(p.label),
                info_row("Version", env!("CARGO_PKG_VERSION"), p, self.scale),
            ]
            .spacing(6)
            .into(),
            p,
        );

        column![page_title("⚙ Settings", p, self.scale), theme_card, a11y_card, research_card, about]
            .spacing(12)
            .into()
    }

    fn option_row(&self, icon: &'static str, label: &'static str, target: ThemeMode, current: ThemeMode) -> Element<'static, Message> {
        let p = &self.pal;
        let is_active = target == current;
        let green = p.green;
        let border_c = p.border;
        let text_c = p.card_text;
        button(
            row![
                text(icon).size(self.sz(16.0)),
                text(label).size(self.sz(13.0)).color(text_c),
                Space::with_width(Length::Fill),
                text(if is_active { "●" } else { "" }).size(self.sz(10.0)).color(green),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
        )
        .on_press(observed(Message::SetThemeMode(target), ElementInfo::new("BUTTON").text(label)))
        .width(Length::Fill)
        .padding([8, 10])
        .style(move |_: &Theme, status| button::Style {
            background: Some(Background::Color(match (is_active, status) {
                (true, _) => Color { a: 0.12, ..green },
                (false, button::Status::Hovered) => Color { a: 0.06, ..green },
                _ => Color::TRANSPARENT,
            })),
            text_color: text_c,
            border: Border { color: if is_active { green } else { border_c }, width: 1.5, radius: 8.0.into() },
            ..Default::default()
        })
        .into()
    }

    fn event_log(&self) -> Element<'static, Message> {
        let p = &self.pal;
        let header = row![
            text(format!("Event log ({})", self.research.event_count())).size(self.sz(12.0)).color(p.card_text),
            Space::with_width(Length::Fill),
            chip(
                "Clear",
                false,
                Message::ClearEventLog,
                ElementInfo::new("BUTTON").observation_label("event-log-clear"),
                p,
                self.scale,
            ),
        ]
        .align_y(Alignment::Center);

        let rows: Element<Message> = if self.research.event_count() == 0 {
            text("No events recorded").size(self.sz(11.0)).color(p.label).into()
        } else {
            let card_bg = p.card_bg;
            let stripe = p.bar_bg;
            Column::with_children(self.research.events().enumerate().map(|(i, ev)| {
                let when = DateTime::from_timestamp_millis(ev.timestamp)
                    .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
                    .unwrap_or_default();
                let detail = ev
                    .metadata
                    .as_ref()
                    .map(|m| serde_json::Value::Object(m.clone()).to_string())
                    .unwrap_or_default();
                let row_bg = if i % 2 == 0 { card_bg } else { Color { a: 0.4, ..stripe } };
                container(
                    row![
                        text(when).size(self.sz(10.0)).font(iced::Font::MONOSPACE).color(p.label).width(64),
                        text(ev.kind.label()).size(self.sz(10.0)).color(p.accent).width(72),
                        text(format!(
                            "{} {}",
                            ev.scope.as_deref().unwrap_or("-"),
                            ev.action.as_deref().unwrap_or("")
                        ))
                        .size(self.sz(11.0))
                        .color(p.card_text),
                        Space::with_width(Length::Fill),
                        text(detail).size(self.sz(9.0)).font(iced::Font::MONOSPACE).color(p.label),
                    ]
                    .spacing(6)
                    .align_y(Alignment::Center),
                )
                .padding([3, 6])
                .style(move |_: &Theme| container::Style {
                    background: Some(Background::Color(row_bg)),
                    ..Default::default()
                })
                .into()
            }))
            .into()
        };

        column![header, rows].spacing(6).into()
    }
}

// ─── HELPERS ───────────────────────────────────────────────────

/// Wrap a message so the click is reported to the research store first.
fn observed(message: Message, target: ElementInfo) -> Message {
    Message::Observed(target, Box::new(message))
}

fn key_name(key: &keyboard::Key) -> String {
    match key {
        keyboard::Key::Named(named) => format!("{named:?}"),
        keyboard::Key::Character(c) => c.to_string(),
        keyboard::Key::Unidentified => "Unidentified".to_string(),
    }
}

fn theme_mode_name(mode: ThemeMode) -> &'static str {
    match mode {
        ThemeMode::Auto => "auto",
        ThemeMode::Fixed(theme) => theme.name(),
    }
}

fn format_date(date: DateTime<Local>) -> String {
    date.format("%b %-d").to_string()
}

fn page_background(bg: ThemeBackground) -> Background {
    match bg {
        ThemeBackground::Solid(c) => Background::Color(c),
        ThemeBackground::Gradient { from, to, angle_deg } => {
            Background::Gradient(Gradient::Linear(
                Linear::new(Radians::from(Degrees(angle_deg))).add_stop(0.0, from).add_stop(1.0, to),
            ))
        }
    }
}

/// Text colors scaled by the page fade.
fn faded(mut p: Palette, opacity: f32) -> Palette {
    let o = opacity.clamp(0.0, 1.0);
    p.text.a *= o;
    p.card_text.a *= o;
    p.label.a *= o;
    p
}

fn lighten(c: Color, amount: f32) -> Color {
    Color::from_rgba((c.r + amount).min(1.0), (c.g + amount).min(1.0), (c.b + amount).min(1.0), c.a)
}

fn themed_bar(value: f32, color: Color, bar_bg: Color) -> Element<'static, Message> {
    progress_bar(0.0..=100.0, value)
        .width(Length::Fill)
        .height(8)
        .style(move |_: &Theme| progress_bar::Style {
            background: Background::Color(bar_bg),
            bar: Background::Color(color),
            border: Border { color: Color::TRANSPARENT, width: 0.0, radius: 4.0.into() },
        })
        .into()
}

fn panel<'a>(content: Element<'a, Message>, p: &Palette) -> Element<'a, Message> {
    let card_bg = p.card_bg;
    let border_c = p.border;
    container(content)
        .width(Length::Fill)
        .padding(14)
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(card_bg)),
            border: Border { color: border_c, width: 1.0, radius: 16.0.into() },
            shadow: Shadow {
                color: Color::from_rgba(0.0, 0.0, 0.0, 0.12),
                offset: Vector::new(0.0, 2.0),
                blur_radius: 8.0,
            },
            ..Default::default()
        })
        .into()
}

fn panel_bg<'a>(content: Element<'a, Message>, bg: Color, border_c: Color) -> Element<'a, Message> {
    container(content)
        .width(Length::Fill)
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(bg)),
            border: Border { color: border_c, width: 1.0, radius: 0.0.into() },
            ..Default::default()
        })
        .into()
}

fn menu_tab(route: Route, current: Route, p: &Palette, scale: f32) -> Element<'static, Message> {
    let is_active = route.is_active(current.path());
    let accent = p.accent;
    let label_c = p.label;
    let color = if is_active { accent } else { label_c };
    button(text(format!("{} {}", route.icon(), route.label())).size(12.0 * scale).color(color))
        .on_press(observed(
            Message::Navigate(route),
            ElementInfo::new("A").observation_label(format!("nav-{}", route.label().to_lowercase())),
        ))
        .padding([4, 10])
        .style(move |_: &Theme, status| {
            let bg = match status {
                button::Status::Hovered => Color::from_rgba(accent.r, accent.g, accent.b, 0.15),
                button::Status::Pressed => Color::from_rgba(accent.r, accent.g, accent.b, 0.25),
                _ if is_active => Color::from_rgba(accent.r, accent.g, accent.b, 0.1),
                _ => Color::TRANSPARENT,
            };
            button::Style {
                background: Some(Background::Color(bg)),
                text_color: color,
                border: Border { color: Color::TRANSPARENT, width: 0.0, radius: 6.0.into() },
                ..Default::default()
            }
        })
        .into()
}

/// Pill button used for filters, tabs and small actions. Presses are
/// reported to the research log as clicks on `target`.
fn chip(
    label: &'static str,
    is_active: bool,
    message: Message,
    target: ElementInfo,
    p: &Palette,
    scale: f32,
) -> Element<'static, Message> {
    let accent = p.accent;
    let border_c = p.border;
    let text_c = if is_active { accent } else { p.card_text };
    button(text(label).size(11.0 * scale).color(text_c))
        .on_press(observed(message, target))
        .padding([4, 12])
        .style(move |_: &Theme, status| button::Style {
            background: Some(Background::Color(match status {
                _ if is_active => Color { a: 0.15, ..accent },
                button::Status::Hovered => Color { a: 0.08, ..accent },
                _ => Color::TRANSPARENT,
            })),
            text_color: text_c,
            border: Border { color: if is_active { accent } else { border_c }, width: 1.0, radius: 999.0.into() },
            ..Default::default()
        })
        .into()
}

fn toggle_row(
    label: &'static str,
    description: &'static str,
    on: bool,
    message: Message,
    target: ElementInfo,
    p: &Palette,
    scale: f32,
) -> Element<'static, Message> {
    let toggle = button(
        text(if on { "◉ On" } else { "○ Off" })
            .size(13.0 * scale)
            .color(if on { p.green } else { p.label }),
    )
    .on_press(observed(message, target))
    .style(button::text)
    .padding(0);

    row![
        column![
            text(label).size(13.0 * scale).color(p.card_text),
            text(description).size(10.0 * scale).color(p.label),
        ]
        .spacing(2)
        .width(Length::Fill),
        toggle,
    ]
    .spacing(12)
    .align_y(Alignment::Center)
    .into()
}

fn page_title(label: &'static str, p: &Palette, scale: f32) -> Element<'static, Message> {
    text(label).size(24.0 * scale).color(p.text).into()
}

fn card_title(label: &'static str, p: &Palette, scale: f32) -> Element<'static, Message> {
    text(label).size(16.0 * scale).color(p.card_text).into()
}

fn info_row(label: &'static str, value: impl ToString, p: &Palette, scale: f32) -> Element<'static, Message> {
    row![
        text(label).size(12.0 * scale).color(p.label),
        Space::with_width(Length::Fill),
        text(value.to_string()).size(12.0 * scale).color(p.card_text),
    ]
    .into()
}

fn env_item(icon: &'static str, value: &str, p: &Palette, scale: f32) -> Element<'static, Message> {
    column![text(icon).size(16.0 * scale), text(value.to_string()).size(10.0 * scale).color(p.card_text)]
        .align_x(Alignment::Center)
        .spacing(2)
        .width(Length::Fill)
        .into()
}

fn behaviour_badge(label: &'static str, color: Color, scale: f32) -> Element<'static, Message> {
    container(text(label).size(11.0 * scale).color(color))
        .padding([4, 10])
        .style(move |_: &Theme| container::Style {
            background: Some(Background::Color(Color { a: 0.12, ..color })),
            border: Border { color, width: 1.0, radius: 999.0.into() },
            ..Default::default()
        })
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data::SESSION_COUNT;
    use crate::storage::MemoryStorage;

    fn app() -> ChargeSense {
        ChargeSense::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_navigation_resets_local_state() {
        let mut app = app();
        let _ = app.update(Message::OpenAchievement("first-charge"));
        let _ = app.update(Message::Navigate(Route::Goals));
        assert_eq!(app.route, Route::Goals);
        assert_eq!(app.open_achievement, None);
        assert_eq!(app.title(), "ChargeSense · Goals");
    }

    #[test]
    fn test_observed_click_is_logged_only_while_logging() {
        let mut app = app();
        let target = ElementInfo::new("A").observation_label("nav-goals");
        let _ = app.update(observed(Message::Navigate(Route::Goals), target.clone()));
        assert_eq!(app.research.event_count(), 0);

        let _ = app.update(Message::ToggleEventLogging);
        let before = app.research.event_count();
        let _ = app.update(observed(Message::Navigate(Route::Carbon), target));
        assert_eq!(app.research.event_count(), before + 1);
        assert_eq!(app.route, Route::Carbon);
    }

    fn click_labels(app: &ChargeSense) -> Vec<String> {
        app.research
            .events()
            .filter(|e| e.action.as_deref() == Some("click"))
            .filter_map(|e| e.metadata.as_ref()?.get("label")?.as_str().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_every_control_message_logs_a_click() {
        let mut app = app();
        let _ = app.update(Message::ToggleEventLogging);
        let id = *app.feedback.keys().next().unwrap();
        let first = app.achievements[0].id;
        let controls = vec![
            (Message::SetStatusFilter(StatusFilter::Unlocked), "status-filter-unlocked"),
            (Message::SetCategoryFilter(Some(AchievementCategory::ALL[1])), "category-filter"),
            (Message::SetCategoryFilter(None), "category-filter-all"),
            (Message::OpenAchievement(first), "achievement-card"),
            (Message::CloseAchievement, "achievement-modal-backdrop"),
            (Message::SetGoalsTab(GoalsTab::Challenges), "goals-tab-challenges"),
            (Message::SetTimeFilter(TimeFilter::Week), "time-filter-week"),
            (Message::TogglePreview, "tree-preview-toggle"),
            (Message::SelectScenario(1), "scenario"),
            (Message::Feedback(id, FeedbackValue::Useful), "feedback-useful"),
            (Message::SetThemeMode(ThemeMode::Fixed(ThemeName::Day)), "theme-day"),
            (Message::ToggleAccessibility(SettingKey::HighContrast), "High Contrast"),
            (Message::ResetAccessibility, "Reset to defaults"),
            (Message::ToggleObservationMode, "observation-mode-toggle"),
            (Message::Navigate(Route::Habits), "nav-habits"),
        ];
        let expected: Vec<&str> = controls.iter().map(|(_, label)| *label).collect();
        for (message, label) in controls {
            let _ = app.update(observed(message, ElementInfo::new("BUTTON").observation_label(label)));
        }

        let mut logged = click_labels(&app);
        logged.reverse();
        assert_eq!(logged, expected);
        assert_eq!(app.status_filter, StatusFilter::Unlocked);
        assert_eq!(app.goals_tab, GoalsTab::Challenges);
        assert_eq!(app.time_filter, TimeFilter::Week);
        assert_eq!(app.open_achievement, None);
        assert_eq!(app.route, Route::Habits);
    }

    #[test]
    fn test_clear_click_lands_before_the_clear() {
        let mut app = app();
        let _ = app.update(Message::ToggleEventLogging);
        let _ = app.update(observed(
            Message::SetTimeFilter(TimeFilter::Month),
            ElementInfo::new("BUTTON").observation_label("time-filter-month"),
        ));
        assert!(app.research.event_count() > 0);
        let _ = app.update(observed(
            Message::ClearEventLog,
            ElementInfo::new("BUTTON").observation_label("event-log-clear"),
        ));
        assert_eq!(app.research.event_count(), 0);
        let _ = app.update(observed(
            Message::ToggleEventLogging,
            ElementInfo::new("BUTTON").observation_label("event-logging-toggle"),
        ));
        assert_eq!(click_labels(&app), vec!["event-logging-toggle".to_string()]);
    }

    #[test]
    fn test_data_pages_regenerate_history() {
        let mut app = app();
        app.sessions.clear();
        let _ = app.update(Message::Navigate(Route::Goals));
        assert!(app.sessions.is_empty());

        for route in [Route::Carbon, Route::Charging, Route::Dashboard] {
            app.sessions.clear();
            let _ = app.update(Message::Navigate(route));
            assert_eq!(app.sessions.len(), SESSION_COUNT);
            assert_eq!(app.carbon_tween.target(), app.carbon.today);
        }
    }

    #[test]
    fn test_habits_page_is_reachable() {
        let mut app = app();
        let _ = app.update(Message::Navigate(Route::Habits));
        assert_eq!(app.title(), "ChargeSense · Digital Habits");
        assert!(!NAV_ITEMS.contains(&app.route));
        let _ = app.view();
    }

    #[test]
    fn test_feedback_flows_into_research_log() {
        let mut app = app();
        let id = *app.feedback.keys().next().unwrap();
        let _ = app.update(Message::Feedback(id, FeedbackValue::Useful));
        let _ = app.update(Message::FeedbackNoteChanged(id, "clear advice".into()));
        let _ = app.update(Message::SubmitFeedbackNote(id));
        assert!(app.feedback[id].note_saved());
        assert_eq!(app.research.events().filter(|e| e.kind.label() == "feedback").count(), 2);
    }

    #[test]
    fn test_accessibility_toggle_changes_scale_and_motion() {
        let mut app = app();
        let _ = app.update(Message::ToggleAccessibility(SettingKey::LargeText));
        assert_eq!(app.scale, 1.25);
        let _ = app.update(Message::ToggleAccessibility(SettingKey::ScreenReaderMode));
        assert!(app.accessibility.disable_motion());
        assert!(!app.is_animating());
        let _ = app.update(Message::ResetAccessibility);
        assert_eq!(app.scale, 1.0);
    }

    #[test]
    fn test_fixed_theme_mode() {
        let mut app = app();
        let _ = app.update(Message::SetThemeMode(ThemeMode::Fixed(ThemeName::Night)));
        assert_eq!(app.theme.theme(), ThemeName::Night);
        assert_eq!(app.theme(), Theme::Dark);
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(&keyboard::Key::Named(keyboard::key::Named::Shift)), "Shift");
        assert_eq!(key_name(&keyboard::Key::Character("a".into())), "a");
    }

    #[test]
    fn test_faded_palette_scales_text_only() {
        let p = build_palette(ThemeName::Day, false);
        let half = faded(p, 0.5);
        assert_eq!(half.text.a, p.text.a * 0.5);
        assert_eq!(half.card_bg, p.card_bg);
    }
}
