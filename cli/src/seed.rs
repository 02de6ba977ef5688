use anyhow::{Context, Result};
use serde_json::{json, Value};

use crate::client;

/// (title, description, minutes on the timer, tip)
type SeedStep = (&'static str, &'static str, Option<f64>, Option<&'static str>);

struct SeedRecipe {
    name: &'static str,
    serving_size: u32,
    ingredients: &'static [&'static str],
    steps: &'static [SeedStep],
}

const SAMPLE_RECIPES: &[SeedRecipe] = &[
    SeedRecipe {
        name: "Fluffy Pancakes",
        serving_size: 4,
        ingredients: &[
            "1 1/2 cups all-purpose flour",
            "3 1/2 tsp baking powder",
            "1 tbsp sugar",
            "1/4 tsp salt",
            "1 1/4 cups milk",
            "1 egg",
            "3 tbsp butter, melted",
        ],
        steps: &[
            (
                "Mix dry ingredients",
                "Whisk the flour, baking powder, sugar, and salt in a large bowl.",
                None,
                None,
            ),
            (
                "Make the batter",
                "Make a well in the center and pour in the milk, egg, and melted butter. Mix until smooth.",
                None,
                Some("A few small lumps are fine; overmixing makes pancakes tough."),
            ),
            (
                "Rest the batter",
                "Let the batter rest while the griddle heats.",
                Some(5.0),
                None,
            ),
            (
                "Cook",
                "Pour 1/4 cup of batter per pancake onto a hot, lightly oiled griddle. Flip when bubbles form and cook until golden.",
                Some(3.0),
                Some("Flip once the edges look dry."),
            ),
        ],
    },
    SeedRecipe {
        name: "Hummingbird Muffins",
        serving_size: 12,
        ingredients: &[
            "2 cups all-purpose flour",
            "1 cup sugar",
            "1 tsp baking soda",
            "1 tsp cinnamon",
            "1/2 tsp salt",
            "2 eggs",
            "3/4 cup vegetable oil",
            "2 ripe bananas, mashed",
            "1 can (8 oz) crushed pineapple, drained",
            "1/2 cup chopped pecans",
        ],
        steps: &[
            (
                "Preheat",
                "Heat the oven to 350°F and line a muffin tin with paper cups.",
                None,
                None,
            ),
            (
                "Combine",
                "Mix the dry ingredients, then stir in the eggs, oil, bananas, pineapple, and pecans until just combined.",
                None,
                None,
            ),
            (
                "Bake",
                "Fill the cups two-thirds full and bake until a toothpick comes out clean.",
                Some(22.0),
                Some("Rotate the tin halfway through for even browning."),
            ),
            (
                "Cool",
                "Cool in the tin, then move to a rack.",
                Some(10.0),
                None,
            ),
        ],
    },
    SeedRecipe {
        name: "Soft-Boiled Eggs",
        serving_size: 2,
        ingredients: &["4 eggs", "Salt and pepper"],
        steps: &[
            (
                "Boil",
                "Lower the eggs into boiling water.",
                Some(6.5),
                None,
            ),
            (
                "Chill",
                "Move the eggs to ice water, peel, and season.",
                Some(1.0),
                None,
            ),
        ],
    },
];

fn recipe_json(recipe: &SeedRecipe) -> Value {
    let total = recipe.steps.len();
    let steps: Vec<Value> = recipe
        .steps
        .iter()
        .enumerate()
        .map(|(i, (title, description, minutes, tip))| {
            let mut step = json!({
                "stepNumber": i + 1,
                "totalSteps": total,
                "title": title,
                "description": description,
            });
            if let Some(minutes) = minutes {
                step["timerDuration"] = json!(minutes);
            }
            if let Some(tip) = tip {
                step["helpfulTip"] = json!(tip);
            }
            step
        })
        .collect();

    json!({
        "name": recipe.name,
        "serving_size": recipe.serving_size,
        "ingredients": recipe.ingredients,
        "steps": steps,
    })
}

/// One upload per recipe, since the server appends only the first recipe of
/// each document.
pub async fn seed(server: &str) -> Result<()> {
    println!("Seeding {} recipes into {}", SAMPLE_RECIPES.len(), server);

    for recipe in SAMPLE_RECIPES {
        let document = json!({ "recipes": [recipe_json(recipe)] }).to_string();
        let saved = client::save_recipe(server, &document)
            .await
            .with_context(|| format!("Failed to upload {}", recipe.name))?;
        println!("  Created: {}", recipe.name);
        tracing::debug!(url = %saved.url, "repository updated");
    }

    println!("Done.");
    Ok(())
}
