//! People Discord commands - `/people list`, `/people add` and `/people delete`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, format, handlers::autocomplete},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    /// Parent command for managing the people at the current location.
    #[poise::command(
        slash_command,
        subcommands("people_list", "people_add", "people_delete")
    )]
    pub async fn people(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "People commands. Available subcommands:\n\
            `/people list` - Show everyone and their tab\n\
            `/people add` - Register a new person\n\
            `/people delete` - Remove a person";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists everyone at the current location with their beverage tab.
    #[poise::command(slash_command, rename = "list")]
    pub async fn people_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        data.client.load_people().await?;
        let state = data.client.snapshot().await;

        let description = format::people_list(
            &state.people,
            data.client.default_beverage(),
            data.catalog.pricing.per_beverage,
        )?;
        let embed = serenity::CreateEmbed::default()
            .title(format!(
                "👥 {}",
                format::location_title(state.current_location.as_ref(), state.location_id)
            ))
            .description(description)
            .color(format::LIST_COLOUR)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} {}",
                state.people.len(),
                if state.people.len() == 1 { "person" } else { "people" }
            )));

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Registers a new person with an empty tab.
    #[poise::command(slash_command, rename = "add")]
    pub async fn people_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Name of the person"] name: String,
    ) -> Result<()> {
        let outcome = ctx.data().client.add_person(&name).await?;
        ctx.say(format::outcome_reply(
            outcome,
            &format!("Added **{}**.", name.trim()),
        ))
        .await?;
        Ok(())
    }

    /// Removes a person from the current location.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn people_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Person to remove"]
        #[autocomplete = "autocomplete::autocomplete_person_name"]
        person: String,
    ) -> Result<()> {
        let client = &ctx.data().client;
        let person = client.find_person_by_name(&person).await?;

        let Some(person_id) = person.id else {
            ctx.say(format!(
                "❌ {} has not been saved yet. Try `/people list` first.",
                person.name
            ))
            .await?;
            return Ok(());
        };

        let outcome = client.delete_person(person_id).await?;
        ctx.say(format::outcome_reply(
            outcome,
            &format!("Removed **{}**.", person.name),
        ))
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
