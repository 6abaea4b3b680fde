// foodgram_server/src/web/routes.rs

use actix_web::{web, HttpResponse};

use crate::web::handlers::{
  ingredient_handlers, recipe_handlers, relation_handlers, shopping_cart_handlers, tag_handlers, user_handlers,
};

async fn health_check_handler() -> HttpResponse {
  HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Literal segments (`me`, `download_shopping_cart`, ...) are registered ahead
// of the `{id}` resources they would otherwise match.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      // Users and subscriptions
      .service(
        web::resource("/users")
          .route(web::get().to(user_handlers::list_users_handler))
          .route(web::post().to(user_handlers::signup_handler)),
      )
      .route("/users/me", web::get().to(user_handlers::me_handler))
      .route("/users/set_password", web::post().to(user_handlers::set_password_handler))
      .route("/users/subscriptions", web::get().to(user_handlers::subscriptions_handler))
      .service(
        web::resource("/users/{id}/subscribe")
          .route(web::get().to(relation_handlers::subscribe_handler))
          .route(web::post().to(relation_handlers::subscribe_handler))
          .route(web::delete().to(relation_handlers::unsubscribe_handler)),
      )
      .route("/users/{id}", web::get().to(user_handlers::get_user_handler))
      // Catalog
      .route("/tags", web::get().to(tag_handlers::list_tags_handler))
      .route("/tags/{id}", web::get().to(tag_handlers::get_tag_handler))
      .route("/ingredients", web::get().to(ingredient_handlers::list_ingredients_handler))
      .route("/ingredients/{id}", web::get().to(ingredient_handlers::get_ingredient_handler))
      // Recipes
      .service(
        web::resource("/recipes")
          .route(web::get().to(recipe_handlers::list_recipes_handler))
          .route(web::post().to(recipe_handlers::create_recipe_handler)),
      )
      .route(
        "/recipes/download_shopping_cart",
        web::get().to(shopping_cart_handlers::download_shopping_cart_handler),
      )
      .service(
        web::resource("/recipes/{id}")
          .route(web::get().to(recipe_handlers::get_recipe_handler))
          .route(web::patch().to(recipe_handlers::update_recipe_handler))
          .route(web::delete().to(recipe_handlers::delete_recipe_handler)),
      )
      .service(
        web::resource("/recipes/{id}/favorite")
          .route(web::get().to(relation_handlers::add_favorite_handler))
          .route(web::post().to(relation_handlers::add_favorite_handler))
          .route(web::delete().to(relation_handlers::remove_favorite_handler)),
      )
      .service(
        web::resource("/recipes/{id}/shopping_cart")
          .route(web::get().to(relation_handlers::add_to_shopping_cart_handler))
          .route(web::post().to(relation_handlers::add_to_shopping_cart_handler))
          .route(web::delete().to(relation_handlers::remove_from_shopping_cart_handler)),
      ),
  );
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::{http::StatusCode, test, App};

  #[actix_web::test]
  async fn health_check_responds_ok() {
    let app = test::init_service(App::new().configure(configure_app_routes)).await;
    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
  }
}
