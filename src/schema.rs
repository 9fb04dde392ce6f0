table! {
    game (id) {
        id -> Text,
        title -> Text,
        release_date -> Timestamptz,
        player_count -> Nullable<Text>,
        recommended_age -> Nullable<Int4>,
        playtime -> Nullable<Int4>,
        description -> Nullable<Text>,
        is_extension -> Bool,
        base_game_id -> Nullable<Text>,
        available -> Bool,
        difficulty_level_id -> Nullable<Text>,
        price_range_id -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    category (id) {
        id -> Text,
        name -> Text,
        reference -> Nullable<Text>,
    }
}

table! {
    award (id) {
        id -> Text,
        name -> Text,
    }
}

table! {
    users (id) {
        id -> Text,
        first_name -> Nullable<Text>,
        last_name -> Nullable<Text>,
        pseudo -> Nullable<Text>,
        avatar -> Nullable<Text>,
    }
}

table! {
    store (id) {
        id -> Text,
        name -> Text,
    }
}

table! {
    collection (id) {
        id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        category_id -> Nullable<Text>,
    }
}

table! {
    difficulty_level (id) {
        id -> Text,
        name -> Text,
        description -> Nullable<Text>,
    }
}

table! {
    price_range (id) {
        id -> Text,
        name -> Text,
    }
}

table! {
    game_category (game_id, category_id) {
        game_id -> Text,
        category_id -> Text,
    }
}

table! {
    game_award (game_id, award_id) {
        game_id -> Text,
        award_id -> Text,
        year -> Int4,
    }
}

table! {
    game_credit (game_id, user_id, role) {
        game_id -> Text,
        user_id -> Text,
        role -> Text,
    }
}

table! {
    game_store_link (game_id, store_id) {
        game_id -> Text,
        store_id -> Text,
        url -> Text,
    }
}

table! {
    game_collection (game_id, collection_id) {
        game_id -> Text,
        collection_id -> Text,
    }
}

joinable!(game -> difficulty_level (difficulty_level_id));
joinable!(game -> price_range (price_range_id));
joinable!(collection -> category (category_id));
joinable!(game_category -> game (game_id));
joinable!(game_category -> category (category_id));
joinable!(game_award -> game (game_id));
joinable!(game_award -> award (award_id));
joinable!(game_credit -> game (game_id));
joinable!(game_credit -> users (user_id));
joinable!(game_store_link -> game (game_id));
joinable!(game_store_link -> store (store_id));
joinable!(game_collection -> game (game_id));
joinable!(game_collection -> collection (collection_id));

allow_tables_to_appear_in_same_query!(
    game,
    category,
    award,
    users,
    store,
    collection,
    difficulty_level,
    price_range,
    game_category,
    game_award,
    game_credit,
    game_store_link,
    game_collection,
);
