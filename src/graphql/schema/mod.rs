use juniper::{
    graphql_object, EmptySubscription, FieldResult, GraphQLInputObject, GraphQLObject, ID,
};
use serde::{Deserialize, Serialize};

use super::Context;

const MOVIES: &str = "movies";
const KEYWORDS: &str = "keywords";
const RATINGS: &str = "ratings";

/// Composite rating identity. Writing under an existing key overwrites.
fn rating_key(user_id: &str, movie_id: &str) -> String {
    format!("{}:{}", user_id, movie_id)
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
}

#[graphql_object]
#[graphql(context = Context)]
impl Movie {
    fn id(&self) -> ID {
        ID::new(self.id.clone())
    }

    fn title(&self) -> &str {
        &self.title
    }

    /// Looks up the keyword document keyed by this movie's id. Movies
    /// without a keyword document resolve to an empty list.
    fn keywords(&self, context: &Context) -> FieldResult<Vec<Keyword>> {
        match context.store.get(KEYWORDS, &self.id)? {
            Some(data) => {
                let doc: KeywordDocument = serde_json::from_value(data)?;
                Ok(doc.keywords)
            }
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: String,
    pub name: String,
}

#[graphql_object]
#[graphql(context = Context)]
impl Keyword {
    fn id(&self) -> ID {
        ID::new(self.id.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// One document per movie in the keywords collection, holding the embedded
/// keyword list in stored order.
#[derive(Debug, Deserialize)]
struct KeywordDocument {
    #[serde(default)]
    keywords: Vec<Keyword>,
}

#[derive(Debug, Deserialize)]
struct RatingDocument {
    score: Option<i32>,
}

pub struct Rating {
    pub user_id: String,
    pub movie_id: String,
    pub score: Option<i32>,
}

#[graphql_object]
#[graphql(context = Context)]
impl Rating {
    fn user_id(&self) -> ID {
        ID::new(self.user_id.clone())
    }

    fn movie_id(&self) -> ID {
        ID::new(self.movie_id.clone())
    }

    fn score(&self) -> Option<i32> {
        self.score
    }
}

#[derive(Debug, GraphQLInputObject)]
pub struct SetRatingInput {
    pub movie_id: ID,
    pub user_id: ID,
    pub score: Option<i32>,
}

#[derive(Debug, GraphQLObject)]
pub struct SetRatingPayload {
    pub message: Option<String>,
}

pub struct Query;

#[graphql_object]
#[graphql(context = Context)]
impl Query {
    /// Every document in the movie collection, in store order.
    fn movies(context: &Context) -> FieldResult<Vec<Movie>> {
        let docs = context.store.list(MOVIES)?;

        let mut movies = Vec::with_capacity(docs.len());
        for doc in docs {
            movies.push(serde_json::from_value(doc)?);
        }

        Ok(movies)
    }

    /// A single movie by id; unknown ids resolve to null.
    fn movie(id: ID, context: &Context) -> FieldResult<Option<Movie>> {
        match context.store.get(MOVIES, &id)? {
            Some(data) => Ok(Some(serde_json::from_value(data)?)),
            None => Ok(None),
        }
    }

    /// The rating one user gave one movie, or null when none is stored.
    fn movie_user_rating(
        movie_id: ID,
        user_id: ID,
        context: &Context,
    ) -> FieldResult<Option<Rating>> {
        let key = rating_key(&user_id, &movie_id);

        match context.store.get(RATINGS, &key)? {
            Some(data) => {
                let doc: RatingDocument = serde_json::from_value(data)?;
                Ok(Some(Rating {
                    user_id: user_id.to_string(),
                    movie_id: movie_id.to_string(),
                    score: doc.score,
                }))
            }
            None => Ok(None),
        }
    }
}

pub struct Mutation;

#[graphql_object]
#[graphql(context = Context)]
impl Mutation {
    /// Upserts `{score}` under `<userId>:<movieId>`. Store failures are
    /// reported through the payload message, never as a field error.
    fn set_rating(set_rating_input: SetRatingInput, context: &Context) -> SetRatingPayload {
        let key = rating_key(&set_rating_input.user_id, &set_rating_input.movie_id);
        let data = serde_json::json!({ "score": set_rating_input.score });

        let message = match context.store.upsert(RATINGS, &key, data) {
            Ok(()) => "success!".to_owned(),
            Err(err) => err.to_string(),
        };

        SetRatingPayload {
            message: Some(message),
        }
    }
}

// A root schema consists of a query and a mutation.
// Request queries can be executed against a RootNode.
pub type Schema = juniper::RootNode<'static, Query, Mutation, EmptySubscription<Context>>;

pub fn schema() -> Schema {
    Schema::new(Query, Mutation, EmptySubscription::new())
}
