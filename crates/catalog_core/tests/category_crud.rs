use catalog_core::db::open_db_in_memory;
use catalog_core::{
    Category, CategoryExample, CategoryField, CategoryRepository, ExampleMatcher,
    ModelValidationError, Order, Product, ProductRepository, RepoError, Sort,
    SqliteCategoryRepository, SqliteProductRepository, StringMatcher,
};

fn seed(repo: &SqliteCategoryRepository<'_>, names: &[&str]) -> Vec<Category> {
    names
        .iter()
        .map(|name| repo.save(&Category::new(*name)).unwrap())
        .collect()
}

#[test]
fn insert_assigns_id_and_audit_dates() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let saved = repo.save(&Category::new("LAPTOP")).unwrap();

    let id = saved.id.unwrap();
    assert!(id > 0);
    let created = saved.created_date.unwrap();
    assert_eq!(saved.last_modified_date, Some(created));

    let loaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(loaded, saved);
    assert_eq!(loaded.name, "LAPTOP");
}

#[test]
fn update_keeps_id_and_created_date() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let mut category = repo.save(&Category::new("LAPTOP")).unwrap();
    let id = category.id.unwrap();
    let created = category.created_date;

    category.name = "LAPTOP MAHAL".to_string();
    let updated = repo.save(&category).unwrap();

    assert_eq!(updated.id, Some(id));
    assert_eq!(updated.created_date, created);
    assert!(updated.last_modified_date.unwrap() >= created.unwrap());

    let reloaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.name, "LAPTOP MAHAL");
    assert_eq!(repo.count().unwrap(), 1);
}

#[test]
fn update_refreshes_last_modified_date_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    let mut category = repo.save(&Category::new("LAPTOP")).unwrap();
    let id = category.id.unwrap();

    conn.execute(
        "UPDATE categories SET created_date = 0, last_modified_date = 0 WHERE id = ?1;",
        [id],
    )
    .unwrap();

    category.name = "LAPTOP MAHAL".to_string();
    let updated = repo.save(&category).unwrap();
    assert_eq!(updated.created_date, Some(0));
    assert!(updated.last_modified_date.unwrap() > 0);

    let reloaded = repo.find_by_id(id).unwrap().unwrap();
    assert_eq!(reloaded.created_date, Some(0));
    assert_eq!(reloaded.last_modified_date, updated.last_modified_date);
}

#[test]
fn save_with_unknown_id_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let mut ghost = Category::new("GHOST");
    ghost.id = Some(404);
    let err = repo.save(&ghost).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "category",
            id: 404
        }
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn blank_name_is_rejected_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    let err = repo.save(&Category::new("   ")).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ModelValidationError::BlankName { .. })
    ));
    assert_eq!(repo.count().unwrap(), 0);
}

#[test]
fn find_by_id_of_missing_row_is_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();

    assert!(repo.find_by_id(1).unwrap().is_none());
    assert!(!repo.exists_by_id(1).unwrap());
}

#[test]
fn find_first_by_name_equals_prefers_lowest_id() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    let seeded = seed(&repo, &["LAPTOP MAHAL", "LAPTOP MAHAL", "GADGET"]);

    let found = repo.find_first_by_name_equals("LAPTOP MAHAL").unwrap().unwrap();
    assert_eq!(found.id, seeded[0].id);
    assert!(repo.find_first_by_name_equals("laptop mahal").unwrap().is_none());
}

#[test]
fn find_all_by_name_like_is_case_sensitive_and_ordered() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    seed(&repo, &["LAPTOP MAHAL", "GADGET", "laptop murah", "LAPTOP"]);

    let names: Vec<String> = repo
        .find_all_by_name_like("%LAPTOP%")
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(names, vec!["LAPTOP MAHAL".to_string(), "LAPTOP".to_string()]);

    assert!(repo.find_all_by_name_like("%TABLET%").unwrap().is_empty());
}

#[test]
fn find_by_name_contains_returns_single_match_or_reports_ambiguity() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    seed(&repo, &["Sample Audit", "LAPTOP", "LAPTOP MAHAL", "LAPTOP MURAH"]);

    let single = repo.find_by_name_contains("Audit").unwrap().unwrap();
    assert_eq!(single.name, "Sample Audit");

    assert!(repo.find_by_name_contains("Missing").unwrap().is_none());

    let err = repo.find_by_name_contains("LAPTOP").unwrap_err();
    assert!(matches!(
        err,
        RepoError::AmbiguousResult { entity: "category" }
    ));
}

#[test]
fn find_by_name_contains_treats_wildcards_literally() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    seed(&repo, &["100% COTTON", "100 PCS"]);

    let found = repo.find_by_name_contains("0%").unwrap().unwrap();
    assert_eq!(found.name, "100% COTTON");
}

#[test]
fn example_with_id_and_name_matches_exactly() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    let seeded = seed(&repo, &["LAPTOP MAHAL", "LAPTOP MAHAL"]);

    let example = CategoryExample::of(&seeded[0]);
    let found = repo
        .find_all_by_example(&example, &ExampleMatcher::matching())
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, seeded[0].id);
}

#[test]
fn example_matcher_ignores_nulls_and_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    seed(&repo, &["LAPTOP MAHAL", "GADGET"]);

    let matcher = ExampleMatcher::matching()
        .with_ignore_null_values()
        .with_ignore_case();
    let found = repo
        .find_all_by_example(&CategoryExample::with_name("lApTop MahAl"), &matcher)
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "LAPTOP MAHAL");

    let strict = repo
        .find_all_by_example(
            &CategoryExample::with_name("lApTop MahAl"),
            &ExampleMatcher::matching(),
        )
        .unwrap();
    assert!(strict.is_empty());
}

#[test]
fn example_matcher_include_nulls_never_matches_persisted_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    seed(&repo, &["LAPTOP MAHAL"]);

    let matcher = ExampleMatcher::matching().with_include_null_values();
    let found = repo
        .find_all_by_example(&CategoryExample::with_name("LAPTOP MAHAL"), &matcher)
        .unwrap();
    assert!(found.is_empty());
}

#[test]
fn example_matcher_supports_prefix_and_any_mode() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    let seeded = seed(&repo, &["LAPTOP MAHAL", "LAPTOP", "GADGET"]);

    let starting = ExampleMatcher::matching().with_string_matcher(StringMatcher::Starting);
    let prefixed = repo
        .find_all_by_example(&CategoryExample::with_name("LAP"), &starting)
        .unwrap();
    assert_eq!(prefixed.len(), 2);

    let any = ExampleMatcher::matching_any();
    let probe = CategoryExample {
        id: seeded[2].id,
        name: Some("LAPTOP".to_string()),
    };
    let either: Vec<_> = repo
        .find_all_by_example(&probe, &any)
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(either, vec!["LAPTOP".to_string(), "GADGET".to_string()]);
}

#[test]
fn find_all_honours_sort() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteCategoryRepository::try_new(&conn).unwrap();
    seed(&repo, &["B", "C", "A"]);

    let by_name: Vec<String> = repo
        .find_all(&Sort::by(Order::asc(CategoryField::Name)))
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(by_name, vec!["A", "B", "C"]);

    let by_id_desc: Vec<String> = repo
        .find_all(&Sort::by(Order::desc(CategoryField::Id)))
        .unwrap()
        .into_iter()
        .map(|category| category.name)
        .collect();
    assert_eq!(by_id_desc, vec!["A", "C", "B"]);
}

#[test]
fn delete_by_id_is_blocked_while_products_reference_category() {
    let conn = open_db_in_memory().unwrap();
    let categories = SqliteCategoryRepository::try_new(&conn).unwrap();
    let products = SqliteProductRepository::try_new(&conn).unwrap();

    let laptop = categories.save(&Category::new("LAPTOP")).unwrap();
    let empty = categories.save(&Category::new("EMPTY")).unwrap();
    let dell = products
        .save(&Product::in_category("DELL", 25_000_000, &laptop).unwrap())
        .unwrap();

    let err = categories.delete_by_id(laptop.id.unwrap()).unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)));
    assert!(categories.exists_by_id(laptop.id.unwrap()).unwrap());
    assert!(products.find_by_id(dell.id.unwrap()).unwrap().is_some());

    assert_eq!(categories.delete_by_id(empty.id.unwrap()).unwrap(), 1);
    assert_eq!(categories.delete_by_id(empty.id.unwrap()).unwrap(), 0);
}
