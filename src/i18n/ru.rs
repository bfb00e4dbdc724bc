use super::Language;

pub static RU: Language = Language {
    months: [
        "Январь",
        "Февраль",
        "Март",
        "Апрель",
        "Май",
        "Июнь",
        "Июль",
        "Август",
        "Сентябрь",
        "Октябрь",
        "Ноябрь",
        "Декабрь",
    ],
    entries: &[
        ("monthly_report", "Ежемесячный отчет"),
        ("generated_on", "Создан: {}"),
        ("legal_notice_title", "Юридическое уведомление"),
        (
            "legal_notice",
            "Этот отчет содержит запись транзакций, связанных с криптотокеном SAVVA. Вам следует внимательно обратить внимание на следующее:

* **Волатильность криптоактивов:** Цена SAVVA, как и всех криптоактивов, очень волатильна и подвержена непредсказуемым колебаниям.

* **Исключительно в информационных целях:** Этот отчет подготовлен исключительно с целью информирования вас об активности вашей учетной записи.

* **Не является финансовым советом:** Этот отчет не является финансовым советом. На него не следует полагаться как на основу для принятия каких-либо финансовых решений.

* **Проконсультируйтесь со специалистом:** Перед использованием этого отчета в каких-либо финансовых целях настоятельно рекомендуется проконсультироваться с квалифицированным специалистом.

* **Отказ от ответственности за конвертацию валюты:** Любые значения в фиатной валюте основаны на цене токена SAVVA на момент создания отчета и будут меняться вместе с ней.

* **Колебания цен:** Цена токена SAVVA может непредсказуемо меняться, и прошлые результаты не являются показателем будущих результатов.
",
        ),
        ("description", "Описание"),
        ("summary.title", "Резюме"),
        (
            "summary.introduction",
            "Этот отчет содержит сводку активности вашего счета SAVVA с *{}* по *{}*.",
        ),
        ("summary.savva_in", "Зачислено на счет"),
        ("summary.savva_out", "Отправлено со счета"),
        ("summary.donations_contributed", "Сделанные пожертвования"),
        ("summary.donations_received", "Полученные пожертвования"),
        ("summary.fund_contributed", "Взносы в фонды постов"),
        ("summary.fund_prizes_won", "Призы из фондов постов"),
        ("summary.staking_in", "Внесено в стейкинг"),
        ("summary.staking_out", "Выведено из стейкинга"),
        ("summary.staking_staked", "Добавлено в стейкинг"),
        ("summary.club_buy", "Потрачено на спонсорство авторов"),
        ("summary.club_claimed", "Получено от спонсоров"),
        ("summary.fundraise_contributed", "Взносы в сборы средств"),
        ("summary.fundraise_received", "Получено от сборов средств"),
        ("summary.paid_for_promotion", "Оплачено за продвижение"),
        ("summary.nft_share_received", "Доля NFT из фондов постов"),
        ("summary.nft_sold_received", "Получено за проданные NFT"),
        ("summary.nft_auction_bids", "Ставки на аукционах NFT"),
        ("summary.nft_auction_received", "Получено с аукционов NFT"),
        ("my_authors.title", "Мои авторы"),
        (
            "my_authors.introduction",
            "Это авторы, которых вы спонсируете. Ваша общая еженедельная поддержка составляет *{}*.",
        ),
        ("sponsored.title", "Спонсируемые пользователи"),
        (
            "sponsored.introduction",
            "Это пользователи SAVVA, которых вы поддерживаете. Суммы еженедельных платежей указаны на момент создания отчета. Ваша общая еженедельная поддержка составляет {}.",
        ),
        ("authors.title", "Публикации моих авторов"),
        (
            "authors.introduction",
            "В этом разделе собраны некоторые публикации авторов, которых вы поддерживаете.",
        ),
        ("account", "Аккаунт"),
        ("total", "Всего"),
        ("my_share", "Моя доля"),
        ("posted", "Опубликовано"),
        ("domain", "Домен"),
        ("table_of_contents", "Содержание"),
    ],
};
