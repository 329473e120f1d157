//! Schedule resolution: which workout belongs to which calendar day.
//!
//! Resolution is pure. A user-defined day bound to the date's weekday wins
//! (first match in definition order); otherwise the rotation table decides.

use crate::catalog::get_default_catalog;
use crate::{
    CustomDay, DayId, ScheduleDefinition, WorkoutCategory, WorkoutDayAssignment,
};
use chrono::{Datelike, NaiveDate, Weekday};

/// Weekdays in display order
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Resolve the workout assigned to a date
pub fn resolve(date: NaiveDate, schedule: &ScheduleDefinition) -> WorkoutDayAssignment {
    resolve_weekday(date.weekday(), schedule)
}

/// Resolve the workout assigned to a weekday
pub fn resolve_weekday(weekday: Weekday, schedule: &ScheduleDefinition) -> WorkoutDayAssignment {
    if let Some(day) = schedule.custom_days.iter().find(|d| d.is_bound_to(weekday)) {
        return custom_assignment(day);
    }
    category_assignment(schedule.rotation.category_for(weekday))
}

/// The seven assignments Monday through Sunday
pub fn week_schedule(schedule: &ScheduleDefinition) -> Vec<(Weekday, WorkoutDayAssignment)> {
    WEEK.iter()
        .map(|&w| (w, resolve_weekday(w, schedule)))
        .collect()
}

/// Look up a day by category name or user-defined id
///
/// User-defined ids are checked first, then category names.
pub fn find_day(schedule: &ScheduleDefinition, id: &str) -> Option<WorkoutDayAssignment> {
    if let Some(day) = schedule.custom_days.iter().find(|d| d.id == id) {
        return Some(custom_assignment(day));
    }
    WorkoutCategory::parse(id).map(category_assignment)
}

/// Assignment for a rotation category, with the catalog's exercise list
pub fn category_assignment(category: WorkoutCategory) -> WorkoutDayAssignment {
    WorkoutDayAssignment {
        id: DayId::Category(category),
        label: category.label().to_string(),
        exercises: get_default_catalog().template_for(category),
    }
}

fn custom_assignment(day: &CustomDay) -> WorkoutDayAssignment {
    WorkoutDayAssignment {
        id: DayId::Custom(day.id.clone()),
        label: day.name.clone(),
        exercises: day.exercises.clone(),
    }
}

/// Weekday from a 0 = Monday index
pub fn weekday_from_index(index: u8) -> Option<Weekday> {
    WEEK.get(index as usize).copied()
}

/// Parse "mon", "Monday", ... into a weekday
pub fn parse_weekday(s: &str) -> Option<Weekday> {
    s.trim().parse::<Weekday>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlannedExercise;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_default_rotation() {
        let schedule = ScheduleDefinition::default();
        // 2024-03-04 is a Monday
        let ids: Vec<DayId> = (0..7)
            .map(|i| resolve(date(2024, 3, 4 + i), &schedule).id)
            .collect();

        assert_eq!(
            ids,
            vec![
                DayId::Category(WorkoutCategory::Push),
                DayId::Category(WorkoutCategory::Pull),
                DayId::Category(WorkoutCategory::Legs),
                DayId::Category(WorkoutCategory::Push),
                DayId::Category(WorkoutCategory::Pull),
                DayId::Category(WorkoutCategory::Legs),
                DayId::Category(WorkoutCategory::Rest),
            ]
        );
    }

    #[test]
    fn test_rotation_assignment_carries_template() {
        let schedule = ScheduleDefinition::default();
        let monday = resolve(date(2024, 3, 4), &schedule);
        assert_eq!(monday.label, "Push Day");
        assert!(!monday.exercises.is_empty());

        let sunday = resolve(date(2024, 3, 10), &schedule);
        assert!(sunday.is_rest());
        assert!(sunday.exercises.is_empty());
    }

    #[test]
    fn test_unlisted_weekday_is_rest() {
        let mut schedule = ScheduleDefinition::default();
        schedule.rotation.slots.remove(&2); // Wednesday

        let wednesday = resolve(date(2024, 3, 6), &schedule);
        assert!(wednesday.is_rest());
    }

    #[test]
    fn test_custom_day_overrides_rotation() {
        let arms = CustomDay::new(
            "Arms",
            Some(Weekday::Sun),
            vec![PlannedExercise::new("bicep_curl", "Dumbbell Bicep Curl", 3, 10, 12)],
        );
        let schedule = ScheduleDefinition {
            custom_days: vec![arms.clone()],
            ..Default::default()
        };

        let sunday = resolve(date(2024, 3, 10), &schedule);
        assert_eq!(sunday.id, DayId::Custom(arms.id));
        assert_eq!(sunday.label, "Arms");
        assert_eq!(sunday.total_sets(), 3);

        // Other weekdays still follow the rotation
        let monday = resolve(date(2024, 3, 4), &schedule);
        assert_eq!(monday.id, DayId::Category(WorkoutCategory::Push));
    }

    #[test]
    fn test_duplicate_weekday_binding_first_match_wins() {
        let first = CustomDay::new("First", Some(Weekday::Tue), vec![]);
        let second = CustomDay::new("Second", Some(Weekday::Tue), vec![]);
        let schedule = ScheduleDefinition {
            custom_days: vec![first.clone(), second],
            ..Default::default()
        };

        let tuesday = resolve(date(2024, 3, 5), &schedule);
        assert_eq!(tuesday.id, DayId::Custom(first.id));
    }

    #[test]
    fn test_unbound_custom_day_is_not_scheduled() {
        let floating = CustomDay::new("Floating", None, vec![]);
        let schedule = ScheduleDefinition {
            custom_days: vec![floating.clone()],
            ..Default::default()
        };

        for (_, assignment) in week_schedule(&schedule) {
            assert_ne!(assignment.id, DayId::Custom(floating.id.clone()));
        }
        assert!(find_day(&schedule, &floating.id).is_some());
    }

    #[test]
    fn test_week_schedule_order() {
        let week = week_schedule(&ScheduleDefinition::default());
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].0, Weekday::Mon);
        assert_eq!(week[6].0, Weekday::Sun);
        assert!(week[6].1.is_rest());
    }

    #[test]
    fn test_find_day_by_category_name() {
        let schedule = ScheduleDefinition::default();
        let legs = find_day(&schedule, "Legs").unwrap();
        assert_eq!(legs.id, DayId::Category(WorkoutCategory::Legs));
        assert!(find_day(&schedule, "cardio").is_none());
    }

    #[test]
    fn test_parse_weekday() {
        assert_eq!(parse_weekday("mon"), Some(Weekday::Mon));
        assert_eq!(parse_weekday("Sunday"), Some(Weekday::Sun));
        assert_eq!(weekday_from_index(6), Some(Weekday::Sun));
        assert_eq!(weekday_from_index(7), None);
    }
}
