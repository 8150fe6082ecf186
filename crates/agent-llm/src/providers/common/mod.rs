pub mod openai_compat;
