// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use diesel::table;

// Every collection lives in one table; `data` holds the document body
table! {
    documents (collection, id) {
        collection -> Text,
        id -> Text,
        data -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
