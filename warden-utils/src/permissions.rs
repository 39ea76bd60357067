use poise::serenity_prelude as serenity;

/// Resolve a member's guild-level permissions from their roles.
///
/// The guild owner always resolves to every permission.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    let resolved = guild
        .roles
        .values()
        .filter(|role| role.id == everyone_role_id || member.roles.contains(&role.id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions);

    Ok(resolved)
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(permits(perms, required))
}

/// `ADMINISTRATOR` implies every other permission.
pub fn permits(granted: serenity::Permissions, required: serenity::Permissions) -> bool {
    granted.contains(serenity::Permissions::ADMINISTRATOR) || granted.contains(required)
}

/// Whether the member holds the given role.
pub async fn member_has_role(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    role_id: serenity::RoleId,
) -> anyhow::Result<bool> {
    let member = guild_id.member(http, user_id).await?;
    Ok(member.roles.contains(&role_id))
}

/// Discord rejected the call for lack of permissions (HTTP 403 / code 50013).
pub fn is_missing_permissions_error(source: &serenity::Error) -> bool {
    matches!(
        source,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 || response.error.code == 50013
    )
}

#[cfg(test)]
mod tests {
    use super::permits;
    use poise::serenity_prelude::Permissions;

    #[test]
    fn administrator_grants_everything() {
        assert!(permits(Permissions::ADMINISTRATOR, Permissions::BAN_MEMBERS));
    }

    #[test]
    fn requires_every_requested_bit() {
        let granted = Permissions::MANAGE_MESSAGES;
        assert!(permits(granted, Permissions::MANAGE_MESSAGES));
        assert!(!permits(
            granted,
            Permissions::MANAGE_MESSAGES | Permissions::MANAGE_CHANNELS
        ));
        assert!(!permits(Permissions::empty(), Permissions::KICK_MEMBERS));
    }
}
