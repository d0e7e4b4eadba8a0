use ts_rs::TS;

fn main() {
    let decls = [
        "// This file was generated by `cargo run --bin generate_types`. Do not edit.".to_string(),
        db::models::user::UserProfile::decl(),
        db::models::user::UpsertUserProfile::decl(),
        db::models::routine_task::RoutineTask::decl(),
        db::models::routine_task::CreateRoutineTask::decl(),
        db::models::focus_routine::Difficulty::decl(),
        db::models::focus_routine::FocusGoal::decl(),
        db::models::focus_routine::PlanningField::decl(),
        db::models::focus_routine::FocusRoutine::decl(),
        db::models::long_term_goal::LongTermGoal::decl(),
        db::models::long_term_goal::UpsertLongTermGoal::decl(),
        db::models::journal_entry::Emotion::decl(),
        db::models::journal_entry::JournalEntry::decl(),
        db::models::journal_entry::CreateJournalEntry::decl(),
        db::models::family_event::FamilyEvent::decl(),
        db::models::family_event::UpsertFamilyEvent::decl(),
        db::models::connection_task::ConnectionTask::decl(),
        services::services::scoring::DailyScore::decl(),
        services::services::urgency::Urgency::decl(),
        services::services::validation::FieldErrors::decl(),
        services::services::routine::RoutineDay::decl(),
        services::services::routine::UpdateFocusGoal::decl(),
        services::services::routine::PlanningNote::decl(),
        services::services::goals::GoalWithUrgency::decl(),
        services::services::goals::GoalBoard::decl(),
        services::services::progress::MonthlyDiscipline::decl(),
        services::services::progress::Dashboard::decl(),
        services::services::progress::AchievementKind::decl(),
        services::services::progress::Achievement::decl(),
        services::services::events::Collection::decl(),
        services::services::events::ChangeOp::decl(),
        services::services::events::ChangeEvent::decl(),
        server::routes::health::HealthStatus::decl(),
        server::routes::journal::JournalAnalysis::decl(),
        server::routes::insights::Quote::decl(),
        utils::response::ApiResponse::<()>::decl(),
    ];

    println!("{}", decls.join("\n\n"));
}
