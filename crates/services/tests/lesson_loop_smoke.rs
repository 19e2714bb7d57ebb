use std::time::Duration;

use chrono::Duration as ChronoDuration;
use nutri_core::model::{FoodDraft, PreferencesDraft, Question};
use nutri_core::time::fixed_now;
use services::{AppServices, Clock, LessonMode, LessonSession, ServicesConfig, Skill};
use storage::repository::{InMemoryRepository, Storage};

fn config() -> ServicesConfig {
    ServicesConfig::default()
        .with_feedback_delay(Duration::ZERO)
        .with_seed(2024)
}

fn correct_input(session: &LessonSession) -> String {
    match session.current_question() {
        Some(Question::Numeric(q)) => q.correct_value().to_string(),
        Some(Question::Comparison(q)) => q.correct().to_owned(),
        Some(Question::TrueFalse(q)) => q.correct().to_owned(),
        None => String::new(),
    }
}

async fn play_perfect_daily(app: &AppServices) {
    let lessons = app.lessons();
    let mut session = lessons.begin(LessonMode::Daily, Skill::Mixed).await.unwrap();
    loop {
        let input = correct_input(&session);
        let (_, result) = lessons.answer(&mut session, &input).await.unwrap();
        if result.is_some() {
            break;
        }
    }
}

#[tokio::test]
async fn lesson_loop_tracks_xp_and_streak_across_days() {
    let store = Storage::from_store(InMemoryRepository::new());
    let mut clock = Clock::fixed(fixed_now());

    let app = AppServices::from_storage(&store, clock, &config());
    app.progress()
        .save_preferences(PreferencesDraft::new(5, 10))
        .await
        .unwrap();

    play_perfect_daily(&app).await;
    play_perfect_daily(&app).await;
    let snapshot = app.progress().snapshot().await.unwrap();
    assert_eq!(snapshot.xp, 100);
    assert_eq!(snapshot.streak, 1);

    clock.advance(ChronoDuration::days(1));
    let app = AppServices::from_storage(&store, clock, &config());
    play_perfect_daily(&app).await;
    let snapshot = app.progress().snapshot().await.unwrap();
    assert_eq!(snapshot.streak, 2);
    assert_eq!(snapshot.best_streak, 2);

    clock.advance(ChronoDuration::days(2));
    let app = AppServices::from_storage(&store, clock, &config());
    play_perfect_daily(&app).await;
    let snapshot = app.progress().snapshot().await.unwrap();
    assert_eq!(snapshot.streak, 1);
    assert_eq!(snapshot.best_streak, 2);
    assert_eq!(snapshot.total_xp, 200);
}

fn food(name: &str, protein: f64) -> FoodDraft {
    FoodDraft {
        name: name.into(),
        serving: "100 g".into(),
        calories: 192.0,
        protein,
        carbs: 8.0,
        fat: 11.0,
        fiber: 5.0,
        category: Some("protein".into()),
        notes: None,
    }
}

#[tokio::test]
async fn edited_catalog_feeds_new_lessons() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()), &config());
    let catalog = app.catalog();
    catalog
        .replace(vec![food("Tempeh", 20.0).validate().unwrap()])
        .await
        .unwrap();

    let session = app
        .lessons()
        .begin(LessonMode::Practice, Skill::Protein)
        .await
        .unwrap();
    assert!(session.questions().iter().all(|q| matches!(
        q,
        Question::Numeric(n) if n.food().name() == "Tempeh"
    )));
    assert!(
        app.lessons()
            .begin(LessonMode::Practice, Skill::Compare)
            .await
            .is_err()
    );

    let foods = catalog.append(food("Seitan", 25.0)).await.unwrap();
    assert_eq!(foods.len(), 2);
    let session = app
        .lessons()
        .begin(LessonMode::Practice, Skill::Compare)
        .await
        .unwrap();
    assert_eq!(session.goal(), 10);
}

#[tokio::test]
async fn progress_view_tracks_answers_and_hearts() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()), &config());
    let lessons = app.lessons();
    let mut session = lessons
        .begin(LessonMode::Practice, Skill::Calories)
        .await
        .unwrap();

    let input = correct_input(&session);
    lessons.answer(&mut session, &input).await.unwrap();
    lessons.answer(&mut session, "100000").await.unwrap();
    lessons.skip(&mut session).await.unwrap();

    let progress = session.progress();
    assert_eq!(progress.answered, 3);
    assert_eq!(progress.goal, 10);
    assert_eq!(progress.hearts, 2);
    assert_eq!(progress.hearts_lost, 1);
    assert!(!progress.is_finished);
    assert!((progress.fraction() - 0.3).abs() < 1e-9);
}
