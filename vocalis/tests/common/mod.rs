#![allow(dead_code)]

use lazy_static::lazy_static;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use vocalis::{
    Chain, Reply, Request, Skill, SkillResult, Template, helpers, intents,
    middleware::{RequestLogger, RequireAccount},
};

// ============================================================================
// Names
// ============================================================================

pub const ADD_ITEM: &str = "AddTodoItem";
pub const REMOVE_ITEM: &str = "RemoveTodoItem";
pub const LIST_ITEMS: &str = "ListTodoItems";
pub const ITEM_SLOT: &str = "item_name";

// ============================================================================
// Templates
// ============================================================================

lazy_static! {
    pub static ref ASK_ITEM: Template = Template::builder("What would you like to add to your list?")
        .name("ask_item")
        .translation("es", "¿Qué te gustaría añadir a tu lista?")
        .build()
        .unwrap();

    pub static ref ITEM_ADDED: Template = Template::builder("Okay. I have added {{ value }} to your list.")
        .name("item_added")
        .translation("es", "Vale. He añadido {{ value }} a tu lista.")
        .build()
        .unwrap();

    pub static ref ITEM_REMOVED: Template = Template::builder(
        "{{#if value.removed}}Okay. I removed {{ value.item }}.{{else}}I couldn't find {{ value.item }} on your list.{{/if}}"
    )
    .name("item_removed")
    .build()
    .unwrap();

    pub static ref LIST: Template = Template::builder(
        "{{#if value}}I found {{ len value }} {{ plural (len value) \"item\" \"items\" }} in your list: {{ join value \", \" \" and \" }}.{{else}}Hmm. Your list is empty.{{/if}}"
    )
    .name("list")
    .helper("len", helpers::len)
    .helper("plural", helpers::plural)
    .helper("join", helpers::join)
    .translation(
        "es",
        "{{#if value}}Encontré {{ len value }} {{ plural (len value) \"cosa\" \"cosas\" }} en tu lista: {{ join value \", \" \" y \" }}.{{else}}Tu lista está vacía.{{/if}}",
    )
    .build()
    .unwrap();

    pub static ref HELP: Template = Template::builder("You can say: add milk to my list.")
        .name("help")
        .translation("es", "Puedes decir: añade leche a mi lista.")
        .translation("fr", "Vous pouvez dire : ajoute du lait à ma liste.")
        .build()
        .unwrap();
}

// ============================================================================
// Todo Service
// ============================================================================

/// In-memory per-user lists.
#[derive(Clone, Default)]
pub struct TodoService {
    items: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl TodoService {
    pub fn items(&self, user_id: &str) -> Vec<String> {
        self.items
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn add(&self, request: Request) -> SkillResult {
        let item = request.slots().resolve(ITEM_SLOT).to_string();
        if item.is_empty() {
            return Reply::new(&request)
                .speak_template(&ASK_ITEM, &())
                .reprompt("Which item?")
                .elicit_slot(&request, ADD_ITEM, ITEM_SLOT)
                .ok();
        }
        self.items
            .lock()
            .unwrap()
            .entry(request.user_id().to_string())
            .or_default()
            .push(item.clone());
        Reply::new(&request).speak_template(&ITEM_ADDED, &item).ok()
    }

    pub async fn remove(&self, request: Request) -> SkillResult {
        let item = request.slots().resolve(ITEM_SLOT).to_string();
        if item.is_empty() {
            return Reply::new(&request)
                .speak("What would you like to remove from your list?")
                .elicit_slot(&request, REMOVE_ITEM, ITEM_SLOT)
                .ok();
        }
        let removed = {
            let mut items = self.items.lock().unwrap();
            let list = items.entry(request.user_id().to_string()).or_default();
            match list.iter().position(|i| *i == item) {
                Some(index) => {
                    list.remove(index);
                    true
                }
                None => false,
            }
        };
        Reply::new(&request)
            .speak_template(&ITEM_REMOVED, &serde_json::json!({"item": item, "removed": removed}))
            .ok()
    }

    pub async fn list(&self, request: Request) -> SkillResult {
        let items = self.items(request.user_id());
        Reply::new(&request)
            .speak_template(&LIST, &items)
            .card("Your list", &items.join("\n"))
            .ok()
    }
}

// ============================================================================
// Skill
// ============================================================================

pub async fn help(request: Request) -> SkillResult {
    Reply::new(&request)
        .speak_template(&HELP, &())
        .end_session(false)
        .ok()
}

pub async fn stop(request: Request) -> SkillResult {
    Reply::new(&request).speak("Goodbye.").ok()
}

/// The todo skill: list changes need a linked account, everything is logged.
pub fn todo_skill(service: &TodoService) -> Skill {
    let logged = Chain::new().with(RequestLogger::new().with_response_speech());
    let linked = logged.clone().with(RequireAccount::new());

    let mut skill = Skill::named("todo");
    let add = service.clone();
    let remove = service.clone();
    let list = service.clone();
    skill
        .launch(logged.then(help))
        .route_intent(intents::HELP, logged.then(help))
        .route_intent(intents::STOP, logged.then(stop))
        .route_intent(intents::CANCEL, logged.then(stop))
        .route_intent(
            ADD_ITEM,
            linked.then(move |request: Request| {
                let add = add.clone();
                async move { add.add(request).await }
            }),
        )
        .route_intent(
            REMOVE_ITEM,
            linked.then(move |request: Request| {
                let remove = remove.clone();
                async move { remove.remove(request).await }
            }),
        )
        .route_intent(
            LIST_ITEMS,
            logged.then(move |request: Request| {
                let list = list.clone();
                async move { list.list(request).await }
            }),
        );
    skill
}

/// A linked user's request, ready for the todo skill.
pub fn linked(request: Request) -> Request {
    request.with_user("user-1").with_access_token("token-1")
}
