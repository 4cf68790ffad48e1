pub mod register_user_usecase;
