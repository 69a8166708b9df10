use crate::{
    core::{
        challenges::{filter_by_category, ALL_CATEGORIES},
        dashboard::Dashboard,
        display,
        leaderboard::{podium, rest, LeaderboardEntry},
    },
    error::BoardResult,
    utils::{escape_html, format_points},
};
use minijinja::{context, AutoEscape, Environment, Template};
use once_cell::sync::Lazy;
use serde::Serialize;
use strum::{EnumIter, IntoEnumIterator};
use tracing::info;

// Podium order on screen: silver, gold, bronze
const PODIUM_LAYOUT: [(usize, &'static str, &'static str); 3] = [
    (1, "silver", "🥈"),
    (0, "gold", "👑"),
    (2, "bronze", "🥉"),
];

static TEMPLATES_ENVIRONMENT: Lazy<Environment> = Lazy::new(|| {
    info!("Initializing templating engine environment.");
    let mut env = Environment::new();
    // Escaping is explicit, through the `escape_html` filter.
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.add_filter("escape_html", |value: String| escape_html(&value));

    // Use strum to iterate over the variants of the enum.
    for template in MessageTemplate::iter() {
        env.add_template(template.name(), template.template())
            .expect("built-in templates are valid");
    }

    info!("Templates loaded in templating engine environment.");

    env
});

#[derive(EnumIter)]
pub enum MessageTemplate {
    Dashboard,
    RankingsHtml,
    LoadError,
}

#[derive(Debug, Serialize)]
struct PodiumPlace {
    class: &'static str,
    crown: &'static str,
    name: String,
    points: String,
}

#[derive(Debug, Serialize)]
struct RankRow {
    rank: usize,
    name: String,
    points: String,
    zero: bool,
}

impl MessageTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            MessageTemplate::Dashboard => "dashboard.txt",
            MessageTemplate::RankingsHtml => "rankings.html",
            MessageTemplate::LoadError => "load_error.txt",
        }
    }

    pub fn get(&self) -> Template<'_, '_> {
        TEMPLATES_ENVIRONMENT
            .get_template(self.name())
            .expect("built-in templates are registered")
    }

    pub fn template(&self) -> &'static str {
        match self {
            MessageTemplate::Dashboard => {
                "🏆 PODIUM\n\
                {%- if podium %}\n\
                {%- for place in podium %}\n\
                \x20 {{ place.crown }} {{ place.name }} ({{ place.points }} pts)\
                {%- endfor %}\n\
                {%- else %}\n\
                \x20 NO SCORES YET - BE THE FIRST!\
                {%- endif %}\n\
                {%- if standings %}\n\n\
                📓 RANKINGS\n\
                {{ standings }}\
                {%- endif %}\n\n\
                🎯 CHALLENGES\n\
                {{ challenges if challenges else '  NO CHALLENGES LOADED' }}\n\n\
                🎮 LATEST COMPLETIONS\n\
                {%- for item in recent %}\n\
                \x20 {{ item.name }} completed {{ item.challenge }} ({{ item.points }} pts) {{ item.date }}{{ ' NEW!' if item.is_new }}\
                {%- else %}\n\
                \x20 NO COMPLETIONS YET - GET STARTED!\
                {%- endfor %}\n\n\
                📊 STATS\n\
                \x20 Participants: {{ stats.active_participants }}\n\
                \x20 Completions: {{ stats.total_completions }}\n\
                \x20 Most popular: {{ stats.most_popular or '-' }}\n\
                \x20 Participation: {{ stats.participation_rate }}%"
            }
            MessageTemplate::RankingsHtml => {
                "{%- for place in podium %}\
                <div class=\"podium-place {{ place.class }}\">\
                <div class=\"podium-crown\">{{ place.crown }}</div>\
                <div class=\"podium-name\">{{ place.name|escape_html }}</div>\
                <div class=\"podium-score\">{{ place.points }} PTS</div>\
                </div>\n\
                {%- endfor %}\
                {%- for row in rows %}\
                <div class=\"rank-row{{ ' zero-points' if row.zero }}\">\
                <span class=\"rank-number\">{{ row.rank }}.</span>\
                <span class=\"rank-name\">{{ row.name|escape_html }}</span>\
                <span class=\"rank-score\">{{ row.points }}</span>\
                </div>\n\
                {%- endfor %}"
            }
            MessageTemplate::LoadError => {
                "FAILED TO LOAD DATA\n\
                {{ reason }}\n\
                Make sure the Google Sheet is published to the web\n\
                and the sheet_id setting is correct."
            }
        }
    }
}

fn podium_places(standings: &[LeaderboardEntry]) -> Vec<PodiumPlace> {
    let top = podium(standings);
    PODIUM_LAYOUT
        .iter()
        .filter_map(|&(idx, class, crown)| {
            top.get(idx).map(|e| PodiumPlace {
                class,
                crown,
                name: e.name.clone(),
                points: format_points(e.points),
            })
        })
        .collect()
}

/// Terminal rendering of the whole dashboard. `top` limits the rankings below the podium.
pub fn dashboard_text(dashboard: &Dashboard, top: Option<usize>) -> BoardResult<String> {
    let below_podium = rest(&dashboard.standings);
    let below_podium = &below_podium[..top.unwrap_or(below_podium.len()).min(below_podium.len())];
    let recent = dashboard
        .recent
        .iter()
        .map(|c| {
            context! {
                name => c.name,
                challenge => c.challenge,
                points => match c.points >= 0.0 {
                    true => format!("+{}", format_points(c.points)),
                    false => format_points(c.points),
                },
                date => c.date,
                is_new => c.is_new,
            }
        })
        .collect::<Vec<_>>();

    let rendered = MessageTemplate::Dashboard.get().render(context! {
        podium => podium_places(&dashboard.standings),
        standings => display::standings(below_podium),
        challenges => display::challenges(&filter_by_category(&dashboard.cards, ALL_CATEGORIES)),
        recent => recent,
        stats => dashboard.statistics,
    })?;
    Ok(rendered)
}

/// HTML fragment with the podium and the rankings below it.
pub fn rankings_html(standings: &[LeaderboardEntry]) -> BoardResult<String> {
    let rows = rest(standings)
        .iter()
        .map(|e| RankRow {
            rank: e.rank,
            name: e.name.clone(),
            points: format_points(e.points),
            zero: e.points == 0.0,
        })
        .collect::<Vec<_>>();

    let rendered = MessageTemplate::RankingsHtml.get().render(context! {
        podium => podium_places(standings),
        rows => rows,
    })?;
    Ok(rendered)
}

pub fn load_error(reason: &str) -> BoardResult<String> {
    let rendered = MessageTemplate::LoadError
        .get()
        .render(context! { reason => reason })?;
    Ok(rendered)
}
