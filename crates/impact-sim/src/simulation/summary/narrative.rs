use super::super::baseline::BaselineSnapshot;
use super::super::domain::{InterventionCategory, Metric, YearlyMetrics, HORIZON_YEARS};
use super::super::effects::EffectSchedule;
use super::scores::percent_change;
use super::ImpactSummary;

#[derive(Debug, Clone, PartialEq)]
pub struct Narrative {
    pub summary: String,
    pub key_insights: Vec<String>,
    pub recommendations: Vec<String>,
}

pub(crate) fn compose(
    region_name: &str,
    snapshot: &BaselineSnapshot,
    trajectory: &[YearlyMetrics],
    schedule: &EffectSchedule,
    impact: &ImpactSummary,
) -> Narrative {
    let Some(final_year) = trajectory.last() else {
        return Narrative {
            summary: format!("No projection available for {region_name}."),
            key_insights: Vec::new(),
            recommendations: Vec::new(),
        };
    };

    let mortality_change = percent_change(final_year, Metric::Mortality);
    let baseline_mortality_trend = percent_change_between(
        snapshot.mortality(),
        final_year.mortality_baseline,
    );

    let summary = if schedule.is_empty() {
        format!(
            "Business-as-usual outlook for {region_name}: without new interventions mortality \
             moves {:.1}% over {HORIZON_YEARS} years ({:.1} to {:.1} per 1,000) on background \
             progress alone, and life expectancy reaches {:.1} years.",
            baseline_mortality_trend,
            snapshot.mortality(),
            final_year.mortality_baseline,
            final_year.life_expectancy_baseline,
        )
    } else {
        format!(
            "With {} active intervention{} in {region_name}, year-{HORIZON_YEARS} mortality is \
             {:.1} per 1,000 against {:.1} on the current path ({:+.1}%), an estimated {} lives \
             saved with an impact score of {:.1}/100 and an economic return of {:.2}x.",
            schedule.effects().len(),
            if schedule.effects().len() == 1 { "" } else { "s" },
            final_year.mortality_rate,
            final_year.mortality_baseline,
            mortality_change,
            format_count(impact.lives_saved),
            impact.impact_score,
            impact.economic_roi,
        )
    };

    let mut key_insights = Vec::new();
    if snapshot.source.is_estimated() {
        key_insights.push(format!(
            "Baseline statistics were estimated: {}",
            snapshot.description
        ));
    }

    if schedule.is_empty() {
        key_insights.push(format!(
            "Background progress alone lifts healthcare access from {:.1}% to {:.1}% by year {HORIZON_YEARS}.",
            trajectory
                .first()
                .map(|year| year.healthcare_baseline)
                .unwrap_or(final_year.healthcare_baseline),
            final_year.healthcare_baseline,
        ));
    } else {
        for category in active_categories(schedule) {
            let [primary, secondary] = category.primary_targets();
            key_insights.push(format!(
                "{} interventions mainly move {} ({:+.1}%) and {} ({:+.1}%) by year {HORIZON_YEARS}.",
                category.label(),
                primary.label().to_lowercase(),
                percent_change(final_year, primary),
                secondary.label().to_lowercase(),
                percent_change(final_year, secondary),
            ));
        }

        if let Some(lead) = impact
            .contributions
            .iter()
            .max_by(|left, right| left.score.total_cmp(&right.score))
        {
            key_insights.push(format!(
                "{} accounts for {:.1}% of the projected improvement.",
                lead.name, lead.score
            ));
        }

        if impact.lives_saved < 0 {
            key_insights.push(
                "Projected mortality exceeds the baseline path; the selected mix worsens outcomes."
                    .to_string(),
            );
        }

        let first_year_gain = trajectory
            .first()
            .map(|year| year.improvement(Metric::Mortality))
            .unwrap_or(0.0);
        let final_gain = final_year.improvement(Metric::Mortality);
        if final_gain > 0.0 && first_year_gain < final_gain {
            key_insights.push(format!(
                "Adoption lag: only {:.0}% of the year-{HORIZON_YEARS} mortality gain is realised in year 1.",
                100.0 * first_year_gain / final_gain
            ));
        }
    }

    let recommendations = recommend(snapshot, final_year, schedule, impact);

    Narrative {
        summary,
        key_insights,
        recommendations,
    }
}

fn recommend(
    snapshot: &BaselineSnapshot,
    final_year: &YearlyMetrics,
    schedule: &EffectSchedule,
    impact: &ImpactSummary,
) -> Vec<String> {
    let mut recommendations = Vec::new();
    let active = active_categories(schedule);

    if schedule.is_empty() {
        recommendations.push(
            "Select at least one intervention to compare against the business-as-usual path."
                .to_string(),
        );
    }

    if final_year.disease_baseline >= 25.0 && !active.contains(&InterventionCategory::Medical) {
        recommendations.push(format!(
            "Disease prevalence stays near {:.1}% on the baseline path; add a Medical intervention \
             such as expanded immunization.",
            final_year.disease_baseline
        ));
    }

    if final_year.healthcare_access < 50.0 {
        if active.contains(&InterventionCategory::Infrastructure)
            || active.contains(&InterventionCategory::Policy)
        {
            recommendations.push(
                "Healthcare access remains below 50%; raise Infrastructure or Policy intensity."
                    .to_string(),
            );
        } else {
            recommendations.push(
                "Healthcare access remains below 50%; pair clinical work with Infrastructure or \
                 Policy interventions."
                    .to_string(),
            );
        }
    }

    if !schedule.is_empty() && impact.economic_roi < 1.0 && snapshot.gdp_per_capita < 5_000.0 {
        recommendations.push(
            "Economic returns trail investment in this low-income setting; WASH or climate \
             resilience spending compounds GDP-linked gains."
                .to_string(),
        );
    }

    if let Some(effect) = schedule
        .effects()
        .iter()
        .filter(|effect| effect.intensity < 50)
        .min_by_key(|effect| effect.intensity)
    {
        recommendations.push(format!(
            "{} runs at {}% intensity; effects saturate, so raising it towards 60-80% captures \
             most of the available gain.",
            effect.name, effect.intensity
        ));
    }

    if impact.impact_score >= 60.0 {
        recommendations.push(
            "Strategy is highly effective; sustain funding beyond year 5 to lock in gains."
                .to_string(),
        );
    }

    if recommendations.is_empty() {
        recommendations.push(
            "Maintain the current intervention mix and review progress annually.".to_string(),
        );
    }

    recommendations
}

fn active_categories(schedule: &EffectSchedule) -> Vec<InterventionCategory> {
    let mut categories: Vec<InterventionCategory> = schedule
        .effects()
        .iter()
        .map(|effect| effect.category)
        .collect();
    categories.sort();
    categories.dedup();
    categories
}

fn percent_change_between(start: f64, end: f64) -> f64 {
    if start.abs() < f64::EPSILON {
        0.0
    } else {
        100.0 * (end - start) / start
    }
}

fn format_count(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
