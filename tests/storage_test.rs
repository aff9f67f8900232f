use souschef::db;
use souschef::embedding::EMBEDDING_DIM;
use souschef::recipe::repository::RecipeRepository;
use souschef::recipe::types::{Macros, RecipeCandidate};

fn candidate(name: &str) -> RecipeCandidate {
    RecipeCandidate {
        name: name.into(),
        description: "a test recipe".into(),
        category: "dinner".into(),
        cuisine: "test".into(),
        ingredients: vec!["pasta".into(), "tomato".into()],
        instructions: vec!["cook it".into()],
        tags: vec![],
    }
}

fn embedding(spike: usize) -> Vec<f32> {
    let mut v = vec![0.0f32; EMBEDDING_DIM];
    v[spike % EMBEDDING_DIM] = 1.0;
    v
}

#[test]
fn open_database_creates_parent_dirs_and_enables_wal() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("recipes.db");

    let conn = db::open_database(&path).unwrap();
    assert!(path.exists());

    let mode: String = conn
        .query_row("PRAGMA journal_mode", [], |r| r.get(0))
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");
}

#[test]
fn recipes_survive_close_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.db");

    let created = {
        let repo = RecipeRepository::new(db::open_database(&path).unwrap());
        repo.create(
            "alice",
            &candidate("Durable Pasta"),
            &["vegetarian".to_string()],
            Macros {
                calories: 300.0,
                protein: 10.0,
                carbs: 50.0,
                fat: 5.0,
            },
            &embedding(3),
        )
        .unwrap()
    };

    // A fresh connection sees the committed row and its vector
    let repo = RecipeRepository::new(db::open_database(&path).unwrap());
    let fetched = repo.get_by_id(&created.id).unwrap();
    assert_eq!(fetched.name, "Durable Pasta");
    assert_eq!(fetched.dietary_tags, vec!["vegetarian"]);
    assert_eq!(fetched.macros, created.macros);

    let similar = repo.find_similar(&embedding(3), 1).unwrap();
    assert_eq!(similar[0].recipe.id, created.id);
}

#[test]
fn reopening_an_existing_database_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recipes.db");

    db::open_database(&path).unwrap();
    // Second open re-runs schema init against the existing file
    let conn = db::open_database(&path).unwrap();

    let count: i64 = conn
        .query_row("SELECT count(*) FROM recipes", [], |r| r.get(0))
        .unwrap();
    assert_eq!(count, 0);
}
