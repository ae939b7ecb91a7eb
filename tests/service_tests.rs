use std::sync::Arc;

use ricettario::clients::google::GoogleProfile;
use ricettario::config::SecurityConfig;
use ricettario::db::Store;
use ricettario::models::ingredient::NewIngredient;
use ricettario::models::recipe::NewRecipe;
use ricettario::services::{
    AuthContext, AuthError, AuthService, RecipeError, RecipeService, Registration, Role,
    SeaOrmAuthService, SeaOrmRecipeService, SeaOrmUserService, UploadStore, UserService,
};

struct TestHarness {
    store: Store,
    auth: SeaOrmAuthService,
    recipes: SeaOrmRecipeService,
    users: SeaOrmUserService,
    images: tempfile::TempDir,
}

async fn harness() -> TestHarness {
    let store = Store::with_pool_options("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open in-memory store");

    let images = tempfile::tempdir().expect("Failed to create temp images dir");
    let uploads = Arc::new(UploadStore::new(images.path()));

    TestHarness {
        auth: SeaOrmAuthService::new(store.clone(), SecurityConfig::default()),
        recipes: SeaOrmRecipeService::new(store.clone(), uploads.clone()),
        users: SeaOrmUserService::new(store.clone(), uploads),
        store,
        images,
    }
}

fn registration(username: &str, email: &str) -> Registration {
    Registration {
        name: "Test".to_string(),
        surname: "User".to_string(),
        email: email.to_string(),
        birthday: None,
        username: username.to_string(),
        password: "hunter2hunter2".to_string(),
    }
}

async fn registered_ctx(h: &TestHarness, username: &str, email: &str) -> AuthContext {
    let user = h
        .auth
        .register(registration(username, email))
        .await
        .expect("registration failed");

    AuthContext {
        user_id: user.id,
        username: username.to_string(),
        role: Role::Default,
    }
}

fn google_profile(email: &str) -> GoogleProfile {
    GoogleProfile {
        email: email.to_string(),
        given_name: Some("Giada".to_string()),
        family_name: Some("De Laurentiis".to_string()),
        birthdate: None,
    }
}

#[tokio::test]
async fn test_duplicate_registration_creates_no_second_credentials_row() {
    let h = harness().await;

    let first = h.auth.register(registration("alice", "alice@example.com")).await;
    assert!(first.is_ok());
    let first_id = first.unwrap().id;

    let second = h.auth.register(registration("alice", "other@example.com")).await;
    assert!(matches!(second, Err(AuthError::UsernameTaken)));

    // Still exactly one credentials row, bound to the first user.
    let credentials = h.store.get_credentials("alice").await.unwrap().unwrap();
    assert_eq!(credentials.user_id, first_id);

    // Only the seeded admin and alice exist.
    assert_eq!(h.store.list_users().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_oidc_first_login_provisions_exactly_once() {
    let h = harness().await;

    let first = h
        .auth
        .login_google(google_profile("giada@example.com"))
        .await
        .unwrap();

    let users_after_first = h.store.list_users().await.unwrap().len();
    let credentials = h
        .store
        .get_credentials("giada@example.com")
        .await
        .unwrap()
        .expect("credentials should be provisioned");
    assert_eq!(credentials.user_id, first.user_id);

    let second = h
        .auth
        .login_google(google_profile("giada@example.com"))
        .await
        .unwrap();

    assert_eq!(second.user_id, first.user_id);
    assert_eq!(h.store.list_users().await.unwrap().len(), users_after_first);

    let user = h.store.get_user(first.user_id).await.unwrap().unwrap();
    assert_eq!(user.provider, "google");
    assert_eq!(user.name, "Giada");
}

#[tokio::test]
async fn test_oidc_login_rejects_locally_taken_email_username() {
    let h = harness().await;

    h.auth
        .register(registration("taken@example.com", "taken@example.com"))
        .await
        .unwrap();

    let result = h.auth.login_google(google_profile("taken@example.com")).await;
    assert!(matches!(result, Err(AuthError::UsernameTaken)));
}

#[tokio::test]
async fn test_recipe_mutation_requires_owner() {
    let h = harness().await;

    let alice = registered_ctx(&h, "alice", "alice@example.com").await;
    let bob = registered_ctx(&h, "bob", "bob@example.com").await;

    let recipe = h
        .recipes
        .create(
            &alice,
            NewRecipe {
                name: "Amatriciana".to_string(),
                description: "Guanciale, tomato, pecorino".to_string(),
                category: Some("Primi".to_string()),
            },
        )
        .await
        .unwrap();

    assert_eq!(recipe.user_id, alice.user_id);

    let update = h
        .recipes
        .update(
            &bob,
            recipe.id,
            ricettario::services::RecipeUpdate {
                name: "Hijacked".to_string(),
                description: "nope".to_string(),
            },
        )
        .await;
    assert!(matches!(update, Err(RecipeError::NotOwner(_))));

    let delete = h.recipes.delete(&bob, recipe.id).await;
    assert!(matches!(delete, Err(RecipeError::NotOwner(_))));

    // Unchanged after both rejected attempts.
    let unchanged = h.recipes.get(recipe.id).await.unwrap();
    assert_eq!(unchanged.name, "Amatriciana");

    // An admin may mutate someone else's recipe.
    let admin = AuthContext {
        user_id: 1,
        username: "admin".to_string(),
        role: Role::Admin,
    };
    h.recipes.delete(&admin, recipe.id).await.unwrap();
    assert!(matches!(
        h.recipes.get(recipe.id).await,
        Err(RecipeError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_photo_upload_appends_and_removal_is_exact() {
    let h = harness().await;

    let alice = registered_ctx(&h, "alice", "alice@example.com").await;
    let recipe = h
        .recipes
        .create(
            &alice,
            NewRecipe {
                name: "Tiramisu".to_string(),
                description: "Coffee and mascarpone".to_string(),
                category: None,
            },
        )
        .await
        .unwrap();

    h.recipes
        .add_photo(&alice, recipe.id, "first.jpg", b"aaa".to_vec())
        .await
        .unwrap();
    h.recipes
        .add_photo(&alice, recipe.id, "second.jpg", b"bbb".to_vec())
        .await
        .unwrap();

    let photos = h.store.list_recipe_photos(recipe.id).await.unwrap();
    assert_eq!(photos.len(), 2);
    assert!(photos.contains(&"first.jpg".to_string()));
    assert!(photos.contains(&"second.jpg".to_string()));
    assert!(h.images.path().join("first.jpg").exists());
    assert!(h.images.path().join("second.jpg").exists());

    h.recipes
        .remove_photo(&alice, recipe.id, "first.jpg")
        .await
        .unwrap();

    let photos = h.store.list_recipe_photos(recipe.id).await.unwrap();
    assert_eq!(photos, vec!["second.jpg".to_string()]);
    assert!(!h.images.path().join("first.jpg").exists());
    assert!(h.images.path().join("second.jpg").exists());

    // Removing an entry that is not there is a structured error.
    let missing = h.recipes.remove_photo(&alice, recipe.id, "ghost.jpg").await;
    assert!(matches!(missing, Err(RecipeError::PhotoNotFound(_))));
}

#[tokio::test]
async fn test_ingredient_removal_is_recipe_scoped() {
    let h = harness().await;

    let alice = registered_ctx(&h, "alice", "alice@example.com").await;

    let pasta = h
        .recipes
        .create(
            &alice,
            NewRecipe {
                name: "Cacio e pepe".to_string(),
                description: "Pecorino and pepper".to_string(),
                category: None,
            },
        )
        .await
        .unwrap();

    let gricia = h
        .recipes
        .create(
            &alice,
            NewRecipe {
                name: "Gricia".to_string(),
                description: "Guanciale and pecorino".to_string(),
                category: None,
            },
        )
        .await
        .unwrap();

    let pecorino = h
        .recipes
        .add_ingredient(
            &alice,
            pasta.id,
            NewIngredient {
                name: "Pecorino".to_string(),
                quantity: 100,
            },
        )
        .await
        .unwrap();

    // Shared with a second recipe.
    h.store.link_ingredient(gricia.id, pecorino.id).await.unwrap();

    h.recipes
        .remove_ingredient(&alice, pasta.id, pecorino.id)
        .await
        .unwrap();

    // Still referenced by gricia, so the row survives.
    assert!(h.store.get_ingredient(pecorino.id).await.unwrap().is_some());

    h.recipes
        .remove_ingredient(&alice, gricia.id, pecorino.id)
        .await
        .unwrap();

    // Last reference gone, row deleted.
    assert!(h.store.get_ingredient(pecorino.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_user_delete_cascades_recipes_and_files() {
    let h = harness().await;

    let alice = registered_ctx(&h, "alice", "alice@example.com").await;

    let recipe = h
        .recipes
        .create(
            &alice,
            NewRecipe {
                name: "Lasagne".to_string(),
                description: "Layers".to_string(),
                category: None,
            },
        )
        .await
        .unwrap();

    h.recipes
        .add_photo(&alice, recipe.id, "lasagne.jpg", b"img".to_vec())
        .await
        .unwrap();
    h.users
        .set_profile_photo(alice.user_id, "alice.png", b"img".to_vec())
        .await
        .unwrap();

    assert!(h.images.path().join("lasagne.jpg").exists());
    assert!(h.images.path().join("alice.png").exists());

    h.users.delete_user(alice.user_id).await.unwrap();

    // Rows gone: recipe, credentials, user.
    assert!(matches!(
        h.recipes.get(recipe.id).await,
        Err(RecipeError::NotFound(_))
    ));
    assert!(h.store.get_credentials("alice").await.unwrap().is_none());
    assert!(h.store.get_user(alice.user_id).await.unwrap().is_none());

    // Files gone too.
    assert!(!h.images.path().join("lasagne.jpg").exists());
    assert!(!h.images.path().join("alice.png").exists());
}

#[tokio::test]
async fn test_cooks_listing_only_includes_recipe_owners() {
    let h = harness().await;

    let alice = registered_ctx(&h, "alice", "alice@example.com").await;
    registered_ctx(&h, "bob", "bob@example.com").await;

    h.recipes
        .create(
            &alice,
            NewRecipe {
                name: "Risotto".to_string(),
                description: "Stirred".to_string(),
                category: None,
            },
        )
        .await
        .unwrap();

    let cooks = h.users.list_cooks().await.unwrap();
    assert_eq!(cooks.len(), 1);
    assert_eq!(cooks[0].email, "alice@example.com");
}
