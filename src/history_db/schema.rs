table! {
    paths (id) {
        id -> BigInt,
        location -> Text,
        name -> Text,
    }
}

table! {
    versions (path_id, version_no) {
        path_id -> BigInt,
        version_no -> BigInt,
        attrs -> Text,
    }
}

allow_tables_to_appear_in_same_query!(paths, versions);

joinable!(versions -> paths(path_id));
